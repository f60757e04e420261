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
#![forbid(unsafe_code)]

//! Cohort Macro Library
//!
//! Procedural macros for the Cohort actor runtime.
//!
//! # Message Macro
//!
//! [`cohort_message`] declares a type that travels through actor mailboxes:
//!
//! ```ignore
//! #[cohort_message]
//! pub struct ReadValue {
//!     pub request_id: u64,
//! }
//!
//! #[cohort_message]
//! pub enum EntityMessage {
//!     Read(ReadValue),
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::parse::Nothing;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Marks a struct or enum as a Cohort message.
///
/// Expands to:
/// - `#[derive(Clone, Debug)]` (only the traits not already derived)
/// - a compile-time assertion that the type is `Send + 'static`, the bound every
///   mailbox places on its payload
///
/// The attribute takes no arguments.
#[proc_macro_attribute]
pub fn cohort_message(attr: TokenStream, item: TokenStream) -> TokenStream {
    parse_macro_input!(attr as Nothing);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits = Vec::new();
        if !has_derive(&input, "Clone") {
            traits.push(quote!(Clone));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let assert_ident = quote::format_ident!("_AssertCohortMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
