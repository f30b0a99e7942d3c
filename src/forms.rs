//! Form definitions and field validation.
//!
//! Forms deserialize leniently (every field defaults to an empty string) so
//! that a missing field surfaces as a field error on the re-rendered page
//! rather than as an extractor rejection.

use serde::Deserialize;
use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_A_FLOAT: &str = "Not a valid float value.";

/// Error messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the fields that failed.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.keys().copied().collect()
    }
}

/// Search form: one required title.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AddMovieForm {
    pub title: String,
    pub csrf_token: String,
}

impl AddMovieForm {
    /// The trimmed title to search for.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            let mut errors = FieldErrors::default();
            errors.add("title", REQUIRED);
            return Err(errors);
        }
        Ok(title.to_string())
    }
}

/// Rating form: a float rating and a review, both required.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EditMovieForm {
    pub rating: String,
    pub review: String,
    pub csrf_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpdate {
    pub rating: f64,
    pub review: String,
}

impl EditMovieForm {
    pub fn validate(&self) -> Result<RatingUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();

        let rating = match self.rating.trim() {
            "" => {
                errors.add("rating", REQUIRED);
                None
            }
            raw => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    errors.add("rating", NOT_A_FLOAT);
                    None
                }
            },
        };

        if self.review.trim().is_empty() {
            errors.add("review", REQUIRED);
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(RatingUpdate {
                rating,
                review: self.review.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(rating: &str, review: &str) -> EditMovieForm {
        EditMovieForm {
            rating: rating.to_string(),
            review: review.to_string(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn test_add_requires_title() {
        let form = AddMovieForm {
            title: "   ".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_add_trims_title() {
        let form = AddMovieForm {
            title: "  Inception ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap(), "Inception");
    }

    #[test]
    fn test_edit_valid() {
        let update = edit("7.5", "Great").validate().unwrap();
        assert_eq!(
            update,
            RatingUpdate {
                rating: 7.5,
                review: "Great".to_string()
            }
        );
    }

    #[test]
    fn test_edit_accepts_zero_and_integers() {
        assert_eq!(edit("0", "Awful").validate().unwrap().rating, 0.0);
        assert_eq!(edit(" 8 ", "Fine").validate().unwrap().rating, 8.0);
    }

    #[test]
    fn test_edit_rejects_non_numeric_rating() {
        let errors = edit("great", "Great").validate().unwrap_err();
        assert_eq!(errors.get("rating"), [NOT_A_FLOAT.to_string()]);
        assert!(errors.get("review").is_empty());
    }

    #[test]
    fn test_edit_rejects_non_finite_rating() {
        assert!(edit("NaN", "x").validate().is_err());
        assert!(edit("inf", "x").validate().is_err());
    }

    #[test]
    fn test_edit_reports_every_missing_field() {
        let errors = edit("", " ").validate().unwrap_err();
        assert_eq!(errors.get("rating"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("review"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_failed_field_names() {
        let errors = edit("", "fine").validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["rating"]);
        assert!(FieldErrors::default().fields().is_empty());
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let form: EditMovieForm = serde_json::from_str("{}").unwrap();
        assert!(form.rating.is_empty());
        assert!(form.validate().is_err());
    }
}
