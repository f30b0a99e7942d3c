//! HTML pages.
//!
//! Pages are assembled with `format!` around a shared Bootstrap layout.
//! Every value that came from a user or from TMDB goes through [`escape`].

use std::fmt::Write;

use crate::forms::{AddMovieForm, EditMovieForm, FieldErrors};
use crate::models::{Movie, RankedMovie};
use crate::tmdb::SearchCandidate;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{css}">
</head>
<body>
<div class="container py-4">
{body}
</div>
</body>
</html>
"#,
        title = escape(title),
        css = BOOTSTRAP_CSS,
        body = body
    )
}

fn csrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(token)
    )
}

fn field_errors(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .iter()
        .map(|e| format!(r#"<div class="invalid-feedback d-block">{}</div>"#, escape(e)))
        .collect()
}

fn invalid_class(errors: &FieldErrors, field: &str) -> &'static str {
    if errors.get(field).is_empty() {
        ""
    } else {
        " is-invalid"
    }
}

fn fmt_rating(rating: Option<f64>) -> String {
    rating.map(|r| r.to_string()).unwrap_or_else(|| "—".to_string())
}

/// Ranked collection, in ascending rating order.
pub fn index(movies: &[RankedMovie]) -> String {
    let mut body = String::from(r#"<h1 class="mb-4">My Top Movies</h1>"#);

    if movies.is_empty() {
        body.push_str(r#"<p class="text-muted">No movies yet.</p>"#);
    }

    for ranked in movies {
        let m = &ranked.movie;
        let _ = write!(
            body,
            r#"
<div class="card mb-3" id="movie-{id}">
  <div class="row g-0">
    <div class="col-md-3"><img src="{img}" class="img-fluid rounded-start" alt="{title} poster"></div>
    <div class="col-md-9">
      <div class="card-body">
        <span class="badge bg-dark ranking">{rank}</span>
        <h2 class="card-title h4">{title} <span class="text-muted">({year})</span></h2>
        <p class="rating">Rating: {rating}</p>
        <p class="review fst-italic">{review}</p>
        <p class="card-text">{description}</p>
        <a href="/edit?id={id}" class="btn btn-primary btn-sm">Update</a>
        <a href="/delete?id={id}" class="btn btn-outline-danger btn-sm">Delete</a>
      </div>
    </div>
  </div>
</div>"#,
            id = m.id,
            img = escape(&m.img_url),
            title = escape(&m.title),
            rank = ranked.rank,
            year = m.year,
            rating = fmt_rating(m.rating),
            review = escape(m.review.as_deref().unwrap_or_default()),
            description = escape(&m.description),
        );
    }

    body.push_str(r#"<p class="mt-4"><a href="/add" class="btn btn-success">Add Movie</a></p>"#);
    layout("My Top Movies", &body)
}

/// Search form.
pub fn add(form: &AddMovieForm, errors: &FieldErrors, csrf_token: &str) -> String {
    let body = format!(
        r#"<h1 class="mb-4">Add a Movie</h1>
<form method="post" action="/add" novalidate>
  {csrf}
  <div class="mb-3">
    <label for="title" class="form-label">Movie Title</label>
    <input type="text" id="title" name="title" class="form-control{invalid}" value="{title}" required>
    {errors}
  </div>
  <button type="submit" class="btn btn-primary">Add Movie</button>
</form>"#,
        csrf = csrf_field(csrf_token),
        invalid = invalid_class(errors, "title"),
        title = escape(&form.title),
        errors = field_errors(errors, "title"),
    );
    layout("Add Movie", &body)
}

/// Search results; each candidate with an id links to `/find`.
pub fn select(candidates: &[SearchCandidate]) -> String {
    let mut body = String::from(r#"<h1 class="mb-4">Select Movie</h1>"#);

    if candidates.is_empty() {
        body.push_str(r#"<p class="text-muted">No matching movies.</p>"#);
    } else {
        body.push_str(r#"<ul class="list-group">"#);
        for c in candidates {
            let title = escape(c.title.as_deref().unwrap_or("(untitled)"));
            let date = escape(c.release_date.as_deref().unwrap_or_default());
            let label = if date.is_empty() {
                title
            } else {
                format!("{} - {}", title, date)
            };
            match c.id {
                Some(id) => {
                    let _ = write!(
                        body,
                        r#"<li class="list-group-item"><a href="/find?id={}">{}</a></li>"#,
                        id, label
                    );
                }
                None => {
                    let _ = write!(body, r#"<li class="list-group-item">{}</li>"#, label);
                }
            }
        }
        body.push_str("</ul>");
    }

    body.push_str(r#"<p class="mt-4"><a href="/add">Search again</a></p>"#);
    layout("Select Movie", &body)
}

/// Rating form for one record.
pub fn edit(movie: &Movie, form: &EditMovieForm, errors: &FieldErrors, csrf_token: &str) -> String {
    let body = format!(
        r#"<h1 class="mb-1">{title}</h1>
<p class="text-muted">Edit Movie Rating</p>
<form method="post" action="/edit?id={id}" novalidate>
  {csrf}
  <div class="mb-3">
    <label for="rating" class="form-label">Your Rating Out of 10 e.g. 7.5</label>
    <input type="text" id="rating" name="rating" class="form-control{rating_invalid}" value="{rating}" required>
    {rating_errors}
  </div>
  <div class="mb-3">
    <label for="review" class="form-label">Your Review</label>
    <input type="text" id="review" name="review" class="form-control{review_invalid}" value="{review}" required>
    {review_errors}
  </div>
  <button type="submit" class="btn btn-primary">Done</button>
</form>"#,
        title = escape(&movie.title),
        id = movie.id,
        csrf = csrf_field(csrf_token),
        rating_invalid = invalid_class(errors, "rating"),
        rating = escape(&form.rating),
        rating_errors = field_errors(errors, "rating"),
        review_invalid = invalid_class(errors, "review"),
        review = escape(&form.review),
        review_errors = field_errors(errors, "review"),
    );
    layout(&format!("Edit {}", movie.title), &body)
}

pub fn error(status: u16, reason: &str, message: &str) -> String {
    let body = format!(
        r#"<h1>{status} {reason}</h1>
<p>{message}</p>
<p><a href="/">Back to the list</a></p>"#,
        status = status,
        reason = escape(reason),
        message = escape(message),
    );
    layout(&format!("{} {}", status, reason), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Movie {
        Movie {
            id: 7,
            title: "<Fight> Club".to_string(),
            year: 1999,
            description: "An insomniac & a soap maker.".to_string(),
            rating: Some(8.5),
            ranking: None,
            review: Some("\"First rule\"".to_string()),
            img_url: "https://image.tmdb.org/t/p/w500/fc.jpg".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }

    #[test]
    fn test_index_renders_rank_and_links() {
        let html = index(&[RankedMovie {
            rank: 1,
            movie: movie(),
        }]);
        assert!(html.contains("&lt;Fight&gt; Club"));
        assert!(!html.contains("<Fight>"));
        assert!(html.contains(r#"<span class="badge bg-dark ranking">1</span>"#));
        assert!(html.contains("/edit?id=7"));
        assert!(html.contains("/delete?id=7"));
        assert!(html.contains("&quot;First rule&quot;"));
    }

    #[test]
    fn test_select_links_only_candidates_with_ids() {
        let html = select(&[
            SearchCandidate {
                id: Some(27205),
                title: Some("Inception".to_string()),
                release_date: Some("2010-07-15".to_string()),
                overview: None,
            },
            SearchCandidate::default(),
        ]);
        assert!(html.contains(r#"<a href="/find?id=27205">Inception - 2010-07-15</a>"#));
        assert!(html.contains("(untitled)"));
        assert_eq!(html.matches("/find?id=").count(), 1);
    }

    #[test]
    fn test_select_empty() {
        assert!(select(&[]).contains("No matching movies."));
    }

    #[test]
    fn test_edit_shows_field_errors() {
        let mut errors = FieldErrors::default();
        errors.add("rating", "Not a valid float value.");
        let form = EditMovieForm {
            rating: "abc".to_string(),
            review: String::new(),
            csrf_token: String::new(),
        };
        let html = edit(&movie(), &form, &errors, "tok");
        assert!(html.contains("Not a valid float value."));
        assert!(html.contains(r#"value="abc""#));
        assert!(html.contains(r#"name="csrf_token" value="tok""#));
        assert!(html.contains(r#"action="/edit?id=7""#));
    }
}
