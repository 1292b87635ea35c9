use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, parse_macro_input};

fn extract_doc(attrs: &[syn::Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("doc")
            && let syn::Meta::NameValue(nv) = &attr.meta
            && let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(s), .. }) = &nv.value
        {
            lines.push(s.value());
        }
    }
    lines.join("\n")
}

/// `ShortCircuit` -> `short_circuit`
fn snake_case(ident: &str) -> String {
    let mut name = String::new();
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.extend(ch.to_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

#[proc_macro_derive(CmdHelp)]
pub fn cmd_help_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_name = &input.ident;

    let Data::Enum(DataEnum { variants, .. }) = &input.data else {
        panic!("CmdHelp can only be derived on enums");
    };

    let pattern_of = |v: &syn::Variant| {
        let variant_name = &v.ident;
        match &v.fields {
            Fields::Unit => quote! { #variant_name },
            Fields::Unnamed(fields) => {
                let wildcards = std::iter::repeat_n(quote! { _ }, fields.unnamed.len());
                quote! { #variant_name(#(#wildcards),*) }
            }
            Fields::Named(fields) => {
                let field_names = fields.named.iter().map(|f| &f.ident);
                quote! { #variant_name { #(#field_names: _),* } }
            }
        }
    };

    // ==============================
    // 1. help(&self) 与 name(&self)
    // ==============================
    let help_entries = variants.iter().map(|v| {
        let pattern = pattern_of(v);
        let doc = extract_doc(&v.attrs);
        quote! {
            Self::#pattern => #doc,
        }
    });
    let name_entries = variants.iter().map(|v| {
        let pattern = pattern_of(v);
        let name = snake_case(&v.ident.to_string());
        quote! {
            Self::#pattern => #name,
        }
    });

    // ==============================
    // 2. from_name()：只支持无字段的变体
    // ==============================
    let from_name_entries = variants.iter().filter(|v| matches!(v.fields, Fields::Unit)).map(|v| {
        let variant_name = &v.ident;
        let name = snake_case(&variant_name.to_string());
        quote! {
            #name => Some(Self::#variant_name),
        }
    });

    // ===========================================
    // 3. all_help()：返回所有 (name, doc) 对
    // ===========================================
    let all_help_entries = variants.iter().map(|v| {
        let name = snake_case(&v.ident.to_string());
        let doc = extract_doc(&v.attrs);
        quote! {
            (#name, #doc)
        }
    });

    let expanded = quote! {
        impl #enum_name {
            /// 获取帮助信息。
            pub fn help(&self) -> &'static str {
                match self {
                    #(#help_entries)*
                }
            }

            /// 获取名称，即变体名的蛇形命名。
            pub fn name(&self) -> &'static str {
                match self {
                    #(#name_entries)*
                }
            }

            /// 根据名称获取无字段的变体。
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    #(#from_name_entries)*
                    _ => None,
                }
            }

            /// 获取全部帮助信息：[(name, help), ...]
            pub fn all_help() -> &'static [(&'static str, &'static str)] {
                &[
                    #(#all_help_entries),*
                ]
            }
        }
    };

    TokenStream::from(expanded)
}
