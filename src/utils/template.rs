use regex::Regex;
use std::sync::OnceLock;

/// Replace `${name}` occurrences using `lookup`; unknown names are left as-is.
pub fn substitute_vars<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    static VAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = VAR_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

    re.replace_all(template, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}
