//! Tag resolution: mapping shorthand tag tokens to canonical URIs, and
//! inferring a tag for an untagged plain scalar under the YAML core schema.

/// Canonical tag URI for an untyped node whose value is `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// Canonical tag URI for a boolean scalar.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// Canonical tag URI for a string scalar.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// Canonical tag URI for an integer scalar.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// Canonical tag URI for a floating-point scalar.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// Canonical tag URI for a sequence.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// Canonical tag URI for a mapping.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// Resolves shorthand tag tokens (`!!str`, `!local`, `!<verbatim>`) scanned
/// from source text into canonical tag URIs, and classifies untagged plain
/// scalars per the YAML core schema.
#[derive(Debug, Clone)]
pub struct TagResolver {
    /// When set, `yes`/`no`/`on`/`off` (in any case) are inferred as
    /// booleans. Off by default: the core schema (YAML 1.2) only treats
    /// `true`/`false` as boolean spellings, but many YAML 1.1 documents in
    /// the wild rely on the wider set.
    pub yaml_1_1_bool_compat: bool,
}

impl Default for TagResolver {
    fn default() -> Self {
        TagResolver {
            yaml_1_1_bool_compat: false,
        }
    }
}

impl TagResolver {
    pub fn new() -> Self {
        TagResolver::default()
    }

    /// Resolve a scanned tag token (`handle`, `suffix`) to a canonical tag
    /// string. `handle` is `"!!"` for the secondary handle, `"!"` for the
    /// primary handle or a local tag, or empty for a verbatim `!<...>` tag.
    pub fn resolve_tag(&self, handle: &str, suffix: &str) -> String {
        match handle {
            "!!" => match suffix {
                "str" => STR_TAG.to_string(),
                "int" => INT_TAG.to_string(),
                "float" => FLOAT_TAG.to_string(),
                "bool" => BOOL_TAG.to_string(),
                "null" => NULL_TAG.to_string(),
                "seq" => SEQ_TAG.to_string(),
                "map" => MAP_TAG.to_string(),
                other => format!("tag:yaml.org,2002:{other}"),
            },
            "!" if suffix.is_empty() => "!".to_string(),
            "!" => format!("!{suffix}"),
            "" => suffix.to_string(),
            _ => format!("{handle}{suffix}"),
        }
    }

    /// Classify an untagged plain scalar's textual value under the core
    /// schema: `null`, `bool`, `int`, `float`, or fall back to `str`.
    pub fn infer_scalar_tag(&self, value: &str) -> &'static str {
        if is_null(value) {
            return NULL_TAG;
        }
        if is_bool(value, self.yaml_1_1_bool_compat) {
            return BOOL_TAG;
        }
        if is_int(value) {
            return INT_TAG;
        }
        if is_float(value) {
            return FLOAT_TAG;
        }
        STR_TAG
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn is_bool(value: &str, compat: bool) -> bool {
    if matches!(value, "true" | "false" | "True" | "False" | "TRUE" | "FALSE") {
        return true;
    }
    if compat {
        return matches!(
            value.to_ascii_lowercase().as_str(),
            "yes" | "no" | "on" | "off"
        );
    }
    false
}

fn is_int(value: &str) -> bool {
    let v = value.strip_prefix(['-', '+']).unwrap_or(value);
    if v.is_empty() {
        return false;
    }
    if let Some(hex) = v.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(oct) = v.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| matches!(c, '0'..='7'));
    }
    if let Some(bin) = v.strip_prefix("0b") {
        return !bin.is_empty() && bin.chars().all(|c| matches!(c, '0' | '1'));
    }
    v.chars().all(|c| c.is_ascii_digit())
}

fn is_float(value: &str) -> bool {
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    let v = value.strip_prefix(['-', '+']).unwrap_or(value);
    if matches!(v, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if v.is_empty() || !v.contains(['.', 'e', 'E']) {
        return false;
    }
    v.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_core_schema_types() {
        let r = TagResolver::new();
        assert_eq!(r.infer_scalar_tag("null"), NULL_TAG);
        assert_eq!(r.infer_scalar_tag("true"), BOOL_TAG);
        assert_eq!(r.infer_scalar_tag("42"), INT_TAG);
        assert_eq!(r.infer_scalar_tag("-0x1A"), INT_TAG);
        assert_eq!(r.infer_scalar_tag("0b1010"), INT_TAG);
        assert_eq!(r.infer_scalar_tag("-0b11"), INT_TAG);
        assert_eq!(r.infer_scalar_tag("3.14"), FLOAT_TAG);
        assert_eq!(r.infer_scalar_tag("hello"), STR_TAG);
    }

    #[test]
    fn yes_no_is_string_unless_compat_enabled() {
        let strict = TagResolver::new();
        assert_eq!(strict.infer_scalar_tag("yes"), STR_TAG);

        let compat = TagResolver {
            yaml_1_1_bool_compat: true,
        };
        assert_eq!(compat.infer_scalar_tag("yes"), BOOL_TAG);
        assert_eq!(compat.infer_scalar_tag("Off"), BOOL_TAG);
    }

    #[test]
    fn resolves_shorthand_tags() {
        let r = TagResolver::new();
        assert_eq!(r.resolve_tag("!!", "str"), STR_TAG);
        assert_eq!(r.resolve_tag("!", "foo"), "!foo");
        assert_eq!(r.resolve_tag("", "tag:example.com,2000:custom"), "tag:example.com,2000:custom");
    }
}
