//! Procedural macros for consensus encoding and decoding of header layouts.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `Encodable` and `Decodable` for a header layout.
///
/// Fields are encoded and decoded in declaration order, so the struct
/// definition is the wire layout. The generated impls refer to
/// `crate::alpha::consensus` and `crate::alpha::io`, so the macro is meant to
/// be used inside `unicity-headerchain`.
///
/// # Example
///
/// ```rust,ignore
/// use unicity_headerchain_derive::ConsensusCodec;
///
/// #[derive(ConsensusCodec)]
/// struct StandardHeader {
///     version: Version,
///     prev_blockhash: BlockHash,
///     merkle_root: TxMerkleNode,
///     time: u32,
///     bits: CompactTarget,
///     nonce: u32,
/// }
/// ```
#[proc_macro_derive(ConsensusCodec)]
pub fn derive_consensus_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(fields) => &fields.unnamed,
            Fields::Unit => {
                return syn::Error::new_spanned(
                    &input,
                    "ConsensusCodec cannot be derived for unit structs",
                )
                .to_compile_error()
                .into();
            }
        },
        Data::Enum(_) => {
            return syn::Error::new_spanned(
                &input,
                "ConsensusCodec cannot be derived for enums; the layout must be fixed",
            )
            .to_compile_error()
            .into();
        }
        Data::Union(_) => {
            return syn::Error::new_spanned(&input, "ConsensusCodec cannot be derived for unions")
                .to_compile_error()
                .into();
        }
    };

    let field_accesses: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            if let Some(ident) = &field.ident {
                quote! { self.#ident }
            } else {
                let index = syn::Index::from(i);
                quote! { self.#index }
            }
        })
        .collect();

    let field_decodes: Vec<_> = fields
        .iter()
        .map(|field| {
            let decode = quote! {
                crate::alpha::consensus::Decodable::consensus_decode_from_finite_reader(reader)?
            };
            match &field.ident {
                Some(ident) => quote! { #ident: #decode },
                None => decode,
            }
        })
        .collect();

    let constructor = if fields.iter().any(|f| f.ident.is_some()) {
        quote! { #name { #(#field_decodes),* } }
    } else {
        quote! { #name(#(#field_decodes),*) }
    };

    let expanded = quote! {
        impl #impl_generics crate::alpha::consensus::Encodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_encode<W: crate::alpha::io::Write + ?Sized>(
                &self,
                writer: &mut W,
            ) -> core::result::Result<usize, crate::alpha::io::Error> {
                let mut len: usize = 0;
                #(
                    len = len.saturating_add(
                        crate::alpha::consensus::Encodable::consensus_encode(&#field_accesses, writer)?,
                    );
                )*
                Ok(len)
            }
        }

        impl #impl_generics crate::alpha::consensus::Decodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_decode_from_finite_reader<R: crate::alpha::io::Read + ?Sized>(
                reader: &mut R,
            ) -> core::result::Result<Self, crate::alpha::consensus::EncodeDecodeError> {
                Ok(#constructor)
            }
        }
    };

    TokenStream::from(expanded)
}
