//! Maps the URL a user shared onto the action API URL to fetch.
use crate::action::spec::{ActionRuleObject, ActionsJson, ICP_ACTIONS_PROTOCOL, ICP_PAY_PROTOCOL};
use crate::error::action::ResolveActionError;
use percent_encoding::percent_decode_str;
use url::Url;

const ACTIONS_JSON_PATH: &str = "/actions.json";

/// Where an action was found. Interstitials and websites are classified by
/// the security gate next to the action itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Website(Url),
    Interstitial(Url),
}

impl Origin {
    pub fn url(&self) -> &Url {
        match self {
            Origin::Website(url) | Origin::Interstitial(url) => url,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.url().host_str()
    }
}

/// A shared URL, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionUrl {
    /// `icp-action:<url>` or `icp:<url>`.
    Direct(Url),
    /// A redirector page carrying `?action=icp-action:<url>`.
    Interstitial { page: Url, action: Url },
    /// Any other page; its `/actions.json` decides.
    Website(Url),
}

impl ActionUrl {
    pub fn parse(input: &str) -> Result<Self, ResolveActionError> {
        let input = input.trim();
        if let Some(action) = strip_protocol(input) {
            return Ok(ActionUrl::Direct(parse_url(&decode(action))?));
        }

        let page = parse_url(input)?;
        let action = page
            .query_pairs()
            .find(|(key, _)| key == "action")
            .map(|(_, value)| value.into_owned());
        if let Some(action) = action.as_deref().and_then(strip_protocol) {
            let action = parse_url(&decode(action))?;
            return Ok(ActionUrl::Interstitial { page, action });
        }
        Ok(ActionUrl::Website(page))
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            ActionUrl::Direct(_) => None,
            ActionUrl::Interstitial { page, .. } => Some(Origin::Interstitial(page.clone())),
            ActionUrl::Website(page) => Some(Origin::Website(page.clone())),
        }
    }
}

fn strip_protocol(input: &str) -> Option<&str> {
    input
        .strip_prefix(ICP_ACTIONS_PROTOCOL)
        .or_else(|| input.strip_prefix(ICP_PAY_PROTOCOL))
}

fn decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

fn parse_url(input: &str) -> Result<Url, ResolveActionError> {
    Url::parse(input).map_err(|err| ResolveActionError::InvalidUrl(input.to_string(), err))
}

/// `https://site/actions.json` for any page of the site.
pub fn actions_json_url(page: &Url) -> Url {
    let mut url = page.clone();
    url.set_path(ACTIONS_JSON_PATH);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Applies the first matching rule of `actions_json` to `page`. Exact rules
/// win over wildcard ones; the page's query string is carried over.
pub fn map_with_rules(page: &Url, actions_json: &ActionsJson) -> Option<Url> {
    let path = page.path();
    let exact = actions_json
        .rules
        .iter()
        .filter(|rule| !rule.path_pattern.contains('*'));
    let wildcard = actions_json
        .rules
        .iter()
        .filter(|rule| rule.path_pattern.contains('*'));

    exact
        .chain(wildcard)
        .find_map(|rule| match_rule(rule, path).map(|api_path| (rule, api_path)))
        .and_then(|(_, api_path)| {
            let mut url = page.join(&api_path).ok()?;
            if url.query().is_none() {
                url.set_query(page.query());
            }
            Some(url)
        })
}

/// Matches `path` against one rule, returning the API path with every
/// wildcard capture substituted in order.
fn match_rule(rule: &ActionRuleObject, path: &str) -> Option<String> {
    let pattern = path_pattern(&rule.path_pattern);
    let captures = match_segments(&segments(pattern), &segments(path))?;

    let mut api_path = rule.api_path.clone();
    for capture in captures {
        match api_path.find("**").or_else(|| api_path.find('*')) {
            Some(at) => {
                let width = if api_path[at..].starts_with("**") { 2 } else { 1 };
                api_path.replace_range(at..at + width, &capture);
            }
            None => break,
        }
    }
    Some(api_path)
}

/// Rules may spell the pattern as a full URL; only its path matters.
fn path_pattern(pattern: &str) -> &str {
    match pattern.find("://") {
        Some(scheme_end) => {
            let rest = &pattern[scheme_end + 3..];
            rest.find('/').map_or("/", |at| &rest[at..])
        }
        None => pattern,
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

fn match_segments(pattern: &[&str], path: &[&str]) -> Option<Vec<String>> {
    let mut captures = vec![];
    for (i, segment) in pattern.iter().enumerate() {
        match *segment {
            "**" => {
                captures.push(path.get(i..).unwrap_or_default().join("/"));
                return Some(captures);
            }
            "*" => captures.push(path.get(i)?.to_string()),
            literal => {
                if path.get(i) != Some(&literal) {
                    return None;
                }
            }
        }
    }
    (pattern.len() == path.len()).then_some(captures)
}
