use std::fmt;

use regex::{NoExpand, Regex};

use crate::{
    database::Quote,
    params::{literal_for, ParamMap},
    ComposerError, ComposerResult,
};

/// One textual replacement performed by [`substitute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Token searched for, sigil included.
    pub placeholder: String,
    /// Literal written in its place.
    pub literal: String,
    /// Whether the token was present in the text.
    pub replaced: bool,
}

/// Receives every substitution as it happens.
pub type SubstitutionObserver = Box<dyn Fn(&Substitution)>;

/// Token for a parameter name; names lacking the sigil get it prepended.
pub fn placeholder_token(name: &str, sigil: char) -> String {
    if name.starts_with(sigil) {
        name.to_string()
    } else {
        format!("{}{}", sigil, name)
    }
}

fn token_pattern(token: &str) -> ComposerResult<Regex> {
    let leading = match token.chars().next() {
        Some(ch) if ch.is_alphanumeric() || ch == '_' => r"\b",
        _ => "",
    };
    let pattern = format!(r"{}{}\b", leading, regex::escape(token));

    Regex::new(&pattern).map_err(|e| ComposerError::InvalidArgument {
        operation: "render_text".to_string(),
        value: format!("{token}: {e}"),
    })
}

/// Replaces the first word-bounded occurrence of each parameter token in
/// `sql`, in the map's order.
pub fn substitute<Q: Quote + ?Sized>(
    sql: &str,
    params: &ParamMap,
    sigil: char,
    quoter: &Q,
    observer: Option<&SubstitutionObserver>,
) -> ComposerResult<String> {
    let mut text = sql.to_string();

    for (name, value) in params {
        let token = placeholder_token(name, sigil);
        let literal = literal_for(value, quoter);
        let pattern = token_pattern(&token)?;
        let replaced = pattern.is_match(&text);

        if replaced {
            text = pattern.replacen(&text, 1, NoExpand(&literal)).into_owned();
        }

        tracing::debug!(placeholder = %token, literal = %literal, replaced, "parameter substituted");

        if let Some(observer) = observer {
            observer(&Substitution { placeholder: token, literal, replaced });
        }
    }

    Ok(text)
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.placeholder, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::{
        database::Detached,
        params::{placeholder_token, substitute, Substitution, SubstitutionObserver},
        params,
    };

    #[test]
    pub fn test_first_occurrence_only() {
        let params = params! { ":age" => 21 };
        let text = substitute("a >= :age AND b <= :age", &params, ':', &Detached, None).unwrap();
        assert_eq!(text, "a >= 21 AND b <= :age");
    }

    #[test]
    pub fn test_word_boundary() {
        let params = params! { ":age" => 30 };
        let text = substitute("x = :agent OR y = :age", &params, ':', &Detached, None).unwrap();
        assert_eq!(text, "x = :agent OR y = 30");
    }

    #[test]
    pub fn test_strings_are_quoted() {
        let params = params! { ":city" => "Porto", ":id" => 4 };
        let text = substitute("city = :city AND id = :id", &params, ':', &Detached, None).unwrap();
        assert_eq!(text, "city = 'Porto' AND id = 4");
    }

    #[test]
    pub fn test_replacement_is_literal() {
        let params = params! { ":p" => "$1 and ${x}" };
        let text = substitute("v = :p", &params, ':', &Detached, None).unwrap();
        assert_eq!(text, "v = '$1 and ${x}'");
    }

    #[test]
    pub fn test_sigil_is_added_to_bare_names() {
        assert_eq!(placeholder_token("age", ':'), ":age");
        assert_eq!(placeholder_token(":age", ':'), ":age");
        assert_eq!(placeholder_token("age", '@'), "@age");

        let params = params! { "age" => 5 };
        let text = substitute("page = :page AND age = :age", &params, ':', &Detached, None).unwrap();
        assert_eq!(text, "page = :page AND age = 5");
    }

    #[test]
    pub fn test_observer_sees_each_substitution() {
        let seen: Rc<RefCell<Vec<Substitution>>> = Rc::new(RefCell::new(vec![]));
        let sink = Rc::clone(&seen);
        let observer: SubstitutionObserver = Box::new(move |s: &Substitution| sink.borrow_mut().push(s.clone()));

        let params = params! { ":a" => 1, ":missing" => "x" };
        let text = substitute("a = :a", &params, ':', &Detached, Some(&observer)).unwrap();
        assert_eq!(text, "a = 1");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].to_string(), ":a => 1");
        assert!(seen[0].replaced);
        assert_eq!(seen[1].literal, "'x'");
        assert!(!seen[1].replaced);
    }
}
