use syn::parse::ParseStream;
use syn::{Attribute, Ident, LitStr, Result};

pub(crate) const XML_ATTRIBUTE_NAME: &str = "xml";

/// What a field's `#[xml(...)]` attributes say about it.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) tag: Option<LitStr>,
    pub(crate) embed: bool,
}

impl FieldAttrs {
    /// Accepts `#[xml("tag")]` and `#[xml(embed)]`. A field may carry at most
    /// one of each, and never both.
    pub(crate) fn parse_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = FieldAttrs::default();

        for attr in attrs {
            if !attr.path().is_ident(XML_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_args_with(|input: ParseStream| {
                if input.peek(LitStr) {
                    let tag: LitStr = input.parse()?;
                    if parsed.tag.is_some() {
                        return Err(syn::Error::new(tag.span(), "duplicate xml tag"));
                    }
                    parsed.tag = Some(tag);
                } else {
                    let ident: Ident = input.parse()?;
                    if ident != "embed" {
                        return Err(syn::Error::new(
                            ident.span(),
                            "expected a tag string or `embed`",
                        ));
                    }
                    parsed.embed = true;
                }
                if !input.is_empty() {
                    return Err(input.error("unexpected tokens after xml attribute"));
                }
                Ok(())
            })?;

            if parsed.embed
                && let Some(tag) = &parsed.tag
            {
                return Err(syn::Error::new(
                    tag.span(),
                    "an embedded field cannot also carry a tag",
                ));
            }
        }

        Ok(parsed)
    }
}
