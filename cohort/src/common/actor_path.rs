/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt;
use std::str::FromStr;

use crate::message::ActorError;

/// A hierarchical actor path such as `/user/manager/group-a`.
///
/// Paths name a position in the supervision tree. Two actors can occupy the same
/// path one after the other (a name is released when its actor terminates), so a
/// path alone does not identify an actor; [`ActorId`] does.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorPath {
    segments: Vec<String>,
}

impl ActorPath {
    /// The root of every tree, rendered as `/`.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns the path of a child called `name` below this one.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::InvalidName`] if `name` is empty, contains `/`, `#`
    /// or whitespace.
    pub fn child(&self, name: &str) -> Result<Self, ActorError> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }
}

fn validate_segment(name: &str) -> Result<(), ActorError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains('/') {
        "name contains '/'"
    } else if name.contains('#') {
        "name contains '#'"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(ActorError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

impl FromStr for ActorPath {
    type Err = ActorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(Self::root(), |path, segment| path.child(segment))
    }
}

impl fmt::Display for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorPath({self})")
    }
}

/// The identity of one actor incarnation: its path plus a system-unique number.
///
/// Equality and hashing cover both parts, so a new actor created at a path that
/// was used before never compares equal to its predecessor.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    path: ActorPath,
    uid: u64,
}

impl ActorId {
    pub(crate) const fn new(path: ActorPath, uid: u64) -> Self {
        Self { path, uid }
    }

    /// The actor's position in the hierarchy.
    #[inline]
    #[must_use]
    pub const fn path(&self) -> &ActorPath {
        &self.path
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path, self.uid)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({self})")
    }
}
