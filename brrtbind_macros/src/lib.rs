use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, Attribute, Data, DeriveInput, Expr, ExprLit, Fields,
    Lit, LitStr, Meta, Visibility,
};

/// Tag carrying the external name and option list.
const PRIMARY_TAG: &str = "request";

/// Parsed attributes of one struct field.
struct FieldAttrs {
    tags: Vec<(String, String)>,
    embedded: bool,
}

/// Struct-level `#[record(...)]` capabilities.
#[derive(Default)]
struct RecordAttrs {
    pre_unmarshal: bool,
    post_unmarshal: bool,
    unmarshaller: bool,
}

fn lit_str(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(syn::Error::new(other.span(), "expected a string literal")),
    }
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs {
        tags: Vec::new(),
        embedded: false,
    };
    for attr in attrs {
        if attr.path().is_ident(PRIMARY_TAG) {
            let value = match &attr.meta {
                Meta::List(_) => attr.parse_args::<LitStr>()?,
                Meta::NameValue(nv) => lit_str(&nv.value)?,
                Meta::Path(p) => {
                    return Err(syn::Error::new(
                        p.span(),
                        "expected #[request(\"name,options\")]",
                    ))
                }
            };
            parsed.tags.push((PRIMARY_TAG.to_string(), value.value()));
        } else if attr.path().is_ident("tag") {
            attr.parse_nested_meta(|meta| {
                let name = meta
                    .path
                    .get_ident()
                    .map(ToString::to_string)
                    .ok_or_else(|| meta.error("expected a tag name"))?;
                let value: LitStr = meta.value()?.parse()?;
                parsed.tags.push((name, value.value()));
                Ok(())
            })?;
        } else if attr.path().is_ident("embed") {
            attr.meta.require_path_only()?;
            parsed.embedded = true;
        }
    }
    Ok(parsed)
}

fn parse_record_attrs(attrs: &[Attribute]) -> syn::Result<RecordAttrs> {
    let mut parsed = RecordAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("pre_unmarshal") {
                parsed.pre_unmarshal = true;
            } else if meta.path.is_ident("post_unmarshal") {
                parsed.post_unmarshal = true;
            } else if meta.path.is_ident("unmarshaller") {
                parsed.unmarshaller = true;
            } else {
                return Err(meta.error(
                    "expected one of pre_unmarshal, post_unmarshal, unmarshaller",
                ));
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

/// True when the field's `request` tag names it `-`.
fn is_ignored(tags: &[(String, String)]) -> bool {
    tags.iter()
        .find(|(tag, _)| tag == PRIMARY_TAG)
        .map(|(_, value)| value.split(',').next().unwrap_or_default().trim() == "-")
        .unwrap_or(false)
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };
    let record_attrs = parse_record_attrs(&input.attrs)?;

    let mut metas = Vec::new();
    let mut arms = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        let ident_str = ident.to_string();
        let ident_str = ident_str.strip_prefix("r#").unwrap_or(&ident_str).to_string();
        let exported = matches!(field.vis, Visibility::Public(_));
        let embedded = attrs.embedded;

        let tag_pairs = attrs.tags.iter().map(|(tag, value)| quote! { (#tag, #value) });
        metas.push(quote! {
            ::brrtbind::FieldMeta {
                ident: #ident_str,
                tags: &[#(#tag_pairs),*],
                exported: #exported,
                embedded: #embedded,
            }
        });

        if embedded {
            arms.push(quote! {
                #index => ::core::option::Option::Some(
                    ::brrtbind::FieldMut::Embedded(&mut self.#ident)
                ),
            });
        } else if exported && !is_ignored(&attrs.tags) {
            arms.push(quote! {
                #index => ::core::option::Option::Some(
                    ::brrtbind::FieldMut::Value(&mut self.#ident)
                ),
            });
        }
    }

    let capability = |enabled: bool, method: TokenStream2, target: TokenStream2| {
        if enabled {
            quote! {
                fn #method(&mut self) -> ::core::option::Option<&mut dyn #target> {
                    ::core::option::Option::Some(self)
                }
            }
        } else {
            TokenStream2::new()
        }
    };
    let pre = capability(
        record_attrs.pre_unmarshal,
        quote!(as_pre_unmarshal),
        quote!(::brrtbind::PreUnmarshal),
    );
    let post = capability(
        record_attrs.post_unmarshal,
        quote!(as_post_unmarshal),
        quote!(::brrtbind::PostUnmarshal),
    );
    let custom = capability(
        record_attrs.unmarshaller,
        quote!(as_unmarshaller),
        quote!(::brrtbind::Unmarshaller),
    );

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::brrtbind::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> &'static [::brrtbind::FieldMeta] {
                const FIELDS: &[::brrtbind::FieldMeta] = &[#(#metas),*];
                FIELDS
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<::brrtbind::FieldMut<'_>> {
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #pre
            #post
            #custom
        }

        impl #impl_generics ::brrtbind::AsRecord for #name #ty_generics #where_clause {
            fn as_record_mut(&mut self) -> ::core::option::Option<&mut dyn ::brrtbind::Record> {
                ::core::option::Option::Some(self)
            }
        }
    })
}

/// Derive `brrtbind::Record` and `brrtbind::AsRecord` for a struct with named
/// fields.
///
/// Field attributes:
/// - `#[request("name,option1,option2")]` external name and options
/// - `#[tag(json = "name", response = "name")]` names for fallback tags
/// - `#[embed]` the field is an embedded record (possibly behind `Option`/`Box`)
///
/// Struct attribute `#[record(pre_unmarshal, post_unmarshal, unmarshaller)]`
/// exposes the matching trait implementations of the type to the binder.
#[proc_macro_derive(Record, attributes(request, tag, embed, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
