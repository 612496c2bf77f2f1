use serde::Deserialize;

use crate::csrf::{self, CsrfSigner};

const CSRF_MISSING: &str = "The CSRF token is missing.";
const CSRF_INVALID: &str = "The CSRF token is invalid.";

/// Field-level validation messages, in field order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> impl Iterator<Item = &str> {
        self.0.iter().filter(move |(f, _)| *f == field).map(|(_, m)| m.as_str())
    }
}

/// Raw edit form input. Kept as strings so bad input can be echoed back.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub new_rating: String,
    #[serde(default)]
    pub new_review: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingUpdate {
    pub rating: f64,
    pub review: String,
}

impl EditForm {
    pub fn validate(&self, signer: &CsrfSigner) -> Result<RatingUpdate, FormErrors> {
        let mut errors = FormErrors::default();
        check_token(&mut errors, signer, csrf::EDIT_FORM, &self.csrf_token);

        let raw_rating = self.new_rating.trim();
        let rating = if raw_rating.is_empty() {
            errors.push("new_rating", "This field is required.");
            None
        } else {
            match raw_rating.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    errors.push("new_rating", "Not a valid number.");
                    None
                },
            }
        };

        let review = self.new_review.trim();
        if review.is_empty() {
            errors.push("new_review", "This field is required.");
        }

        match rating {
            Some(rating) if errors.is_empty() => {
                Ok(RatingUpdate { rating, review: review.to_string() })
            },
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl AddForm {
    pub fn validate(&self, signer: &CsrfSigner) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        check_token(&mut errors, signer, csrf::ADD_FORM, &self.csrf_token);

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title", "This field is required.");
        }

        if errors.is_empty() { Ok(title.to_string()) } else { Err(errors) }
    }
}

fn check_token(errors: &mut FormErrors, signer: &CsrfSigner, form: &str, token: &str) {
    if token.trim().is_empty() {
        errors.push("csrf_token", CSRF_MISSING);
    } else if !signer.verify(form, token) {
        errors.push("csrf_token", CSRF_INVALID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> CsrfSigner {
        CsrfSigner::new("test-secret").unwrap()
    }

    fn edit(rating: &str, review: &str) -> EditForm {
        EditForm {
            new_rating: rating.to_string(),
            new_review: review.to_string(),
            csrf_token: signer().issue(csrf::EDIT_FORM),
        }
    }

    fn add(title: &str) -> AddForm {
        AddForm { title: title.to_string(), csrf_token: signer().issue(csrf::ADD_FORM) }
    }

    #[test]
    fn valid_edit_is_trimmed() {
        let update = edit(" 8.2 ", "  Great ").validate(&signer()).unwrap();
        assert_eq!(update, RatingUpdate { rating: 8.2, review: "Great".to_string() });
    }

    #[test]
    fn empty_review_is_rejected() {
        let errors = edit("8.2", "   ").validate(&signer()).unwrap_err();
        assert_eq!(errors.for_field("new_review").count(), 1);
        assert_eq!(errors.for_field("new_rating").count(), 0);
    }

    #[test]
    fn rating_must_be_a_number() {
        let errors = edit("great", "ok").validate(&signer()).unwrap_err();
        assert_eq!(errors.for_field("new_rating").collect::<Vec<_>>(), vec!["Not a valid number."]);

        assert!(edit("NaN", "ok").validate(&signer()).is_err());
        assert!(edit("", "ok").validate(&signer()).is_err());
    }

    #[test]
    fn add_requires_title() {
        assert!(add("  ").validate(&signer()).is_err());
        assert_eq!(add(" Heat ").validate(&signer()).unwrap(), "Heat");
    }

    #[test]
    fn missing_token_is_rejected() {
        let mut form = edit("8", "Fine");
        form.csrf_token.clear();

        let errors = form.validate(&signer()).unwrap_err();
        assert_eq!(errors.for_field("csrf_token").collect::<Vec<_>>(), vec![CSRF_MISSING]);
    }

    #[test]
    fn token_for_another_form_is_rejected() {
        let mut form = add("Heat");
        form.csrf_token = signer().issue(csrf::EDIT_FORM);

        let errors = form.validate(&signer()).unwrap_err();
        assert_eq!(errors.for_field("csrf_token").collect::<Vec<_>>(), vec![CSRF_INVALID]);
        assert_eq!(errors.for_field("title").count(), 0);
    }
}
