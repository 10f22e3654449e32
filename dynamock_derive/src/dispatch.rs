// vim: tw=80
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse2,
    spanned::Spanned,
    FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Type,
};

use crate::compile_error;

/// How a reference argument is passed to the real method
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Pass {
    Value,
    Ref,
    RefMut,
}

/// Is this `#[dispatch(skip)]`?
fn is_skip_attr(attr: &syn::Attribute) -> bool {
    if !attr.path().is_ident("dispatch") {
        return false;
    }
    match attr.parse_args::<syn::Ident>() {
        Ok(ident) if ident == "skip" => true,
        _ => {
            compile_error(attr.span(),
                "The only option for methods is #[dispatch(skip)]");
            false
        }
    }
}

/// Convert a special unsized type like "str" into its owned type like
/// "String", so that it can be carried by a Value.
fn destrify(ty: &mut Type) {
    let owned: Option<Type> = match ty {
        Type::Path(tp) if tp.qself.is_none() => {
            let last = tp.path.segments.last()
                .filter(|seg| seg.arguments.is_empty())
                .map(|seg| seg.ident.to_string());
            match last.as_deref() {
                Some("str") => Some(parse2(quote!(::std::string::String))),
                Some("Path") => Some(parse2(quote!(::std::path::PathBuf))),
                Some("OsStr") => Some(parse2(quote!(::std::ffi::OsString))),
                Some("CStr") => Some(parse2(quote!(::std::ffi::CString))),
                _ => None
            }.and_then(Result::ok)
        },
        Type::Slice(ts) => {
            let elem = &ts.elem;
            parse2(quote!(::std::vec::Vec<#elem>)).ok()
        },
        _ => None
    };
    if let Some(owned) = owned {
        *ty = owned;
    }
}

/// The owned type carried for an argument, and how to pass it.  `None` if
/// the argument can't be supplied dynamically.
fn plan_arg(ty: &Type) -> Option<(Type, Pass)> {
    match ty {
        Type::ImplTrait(_) => None,
        Type::Reference(r) => {
            if let Type::ImplTrait(_) = r.elem.as_ref() {
                return None;
            }
            let mut owned = r.elem.as_ref().clone();
            destrify(&mut owned);
            let pass = if r.mutability.is_some() {
                Pass::RefMut
            } else {
                Pass::Ref
            };
            Some((owned, pass))
        },
        _ => Some((ty.clone(), Pass::Value))
    }
}

/// Generate the match arm that dispatches to one method, or `None` if the
/// method can't be dispatched.
fn gen_arm(f: &ImplItemFn, trait_: Option<&syn::Path>) -> Option<TokenStream>
{
    let sig = &f.sig;
    if sig.asyncness.is_some() || sig.unsafety.is_some() ||
        sig.variadic.is_some() ||
        sig.generics.type_params().next().is_some() ||
        sig.generics.const_params().next().is_some()
    {
        return None;
    }
    match sig.inputs.first() {
        Some(FnArg::Receiver(r)) if r.reference.is_some() => (),
        _ => return None
    }

    let mut bindings = Vec::new();
    let mut passes = Vec::new();
    for (i, arg) in sig.inputs.iter().skip(1).enumerate() {
        let FnArg::Typed(pat_ty) = arg else {
            return None;
        };
        let (owned, pass) = plan_arg(&pat_ty.ty)?;
        let name = format_ident!("arg{}", i);
        bindings.push(quote!(
            let mut #name = ::dynamock::Value::take_arg::<#owned>(
                __it.next(), method, #i)?;
        ));
        passes.push(match pass {
            Pass::Value => quote!(#name),
            Pass::Ref => quote!(&#name),
            Pass::RefMut => quote!(&mut #name),
        });
    }
    let nargs = bindings.len();

    let ident = &sig.ident;
    let call = match trait_ {
        Some(path) => quote!(<Self as #path>::#ident(self, #(#passes),*)),
        None => quote!(Self::#ident(self, #(#passes),*)),
    };
    let ret = match &sig.output {
        ReturnType::Default => quote!(::dynamock::Value::new(#call)),
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::ImplTrait(_) => return None,
            Type::Reference(_) => quote!(::dynamock::Value::new(
                ::std::borrow::ToOwned::to_owned(&*#call))),
            _ => quote!(::dynamock::Value::new(#call)),
        }
    };
    let name = ident.to_string();
    Some(quote!(
        #name => {
            if __args.len() != #nargs {
                return ::std::result::Result::Err(
                    ::dynamock::MockError::Arity {
                        method: ::std::borrow::ToOwned::to_owned(method),
                        expected: #nargs,
                        actual: __args.len(),
                    });
            }
            let mut __it = __args.into_iter();
            #(#bindings)*
            ::std::result::Result::Ok(#ret)
        }
    ))
}

pub(crate) fn do_dispatch(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    if !attrs.is_empty() {
        compile_error(attrs.span(),
            "#[dispatch] does not take any options on an impl block");
    }
    let mut item: ItemImpl = match parse2(input) {
        Ok(i) => i,
        Err(e) => return e.to_compile_error()
    };

    let trait_ = item.trait_.as_ref().map(|(_, path, _)| path.clone());
    let mut arms = Vec::new();
    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(f) = impl_item {
            let before = f.attrs.len();
            f.attrs.retain(|attr| !is_skip_attr(attr));
            if f.attrs.len() != before {
                continue;
            }
            if let Some(arm) = gen_arm(f, trait_.as_ref()) {
                arms.push(arm);
            }
        }
    }

    let self_ty = &item.self_ty;
    let (ig, _tg, wc) = item.generics.split_for_impl();
    quote!(
        #item

        impl #ig ::dynamock::Dispatch for #self_ty #wc {
            #[allow(unused_mut)]
            fn dispatch(&mut self, method: &str, args: ::dynamock::Args)
                -> ::std::result::Result<::dynamock::Value,
                                         ::dynamock::MockError>
            {
                let __args = args.into_values();
                match method {
                    #(#arms)*
                    _ => ::std::result::Result::Err(
                        ::dynamock::MockError::UnexpectedCall {
                            handle: ::std::borrow::ToOwned::to_owned(
                                ::std::any::type_name::<Self>()),
                            method: ::std::borrow::ToOwned::to_owned(method),
                        })
                }
            }
        }
    )
}
