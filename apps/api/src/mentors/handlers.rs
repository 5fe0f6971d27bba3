use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mentors::repo;
use crate::models::mentor::Mentor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MentorFilter {
    /// `all` (default), `quotes` or `journey`.
    pub category: Option<String>,
    pub search: Option<String>,
}

impl MentorFilter {
    fn matches(&self, mentor: &Mentor) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some("") | Some("all") => true,
            Some(c) => mentor.category.as_deref() == Some(c),
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                std::iter::once(mentor.name.as_str())
                    .chain(mentor.bio.as_deref())
                    .chain(mentor.title.as_deref())
                    .any(|field| field.to_lowercase().contains(&term))
            }
        };
        category_ok && search_ok
    }
}

#[derive(Debug, Serialize)]
pub struct MentorView {
    #[serde(flatten)]
    pub mentor: Mentor,
    pub is_followed: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryCounts {
    pub all: usize,
    pub quotes: usize,
    pub journey: usize,
}

#[derive(Debug, Serialize)]
pub struct MentorListResponse {
    pub mentors: Vec<MentorView>,
    /// Counts over the whole catalogue, before filtering.
    pub counts: CategoryCounts,
}

/// GET /api/v1/mentors?category=&search=
pub async fn handle_list_mentors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<MentorFilter>,
) -> Result<Json<DataResponse<MentorListResponse>>, AppError> {
    let store = state.store.as_ref();
    let (mentors, follows) =
        tokio::try_join!(repo::list_mentors(store), repo::list_follows(store, user.id()))?;
    let followed: HashSet<Uuid> = follows.into_iter().map(|f| f.mentor_id).collect();

    let count = |c: &str| {
        mentors
            .iter()
            .filter(|m| m.category.as_deref() == Some(c))
            .count()
    };
    let counts = CategoryCounts {
        all: mentors.len(),
        quotes: count("quotes"),
        journey: count("journey"),
    };

    let mentors = mentors
        .into_iter()
        .filter(|m| filter.matches(m))
        .map(|mentor| MentorView {
            is_followed: followed.contains(&mentor.id),
            mentor,
        })
        .collect();

    Ok(DataResponse::json(MentorListResponse { mentors, counts }))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::models::tables::{MENTORS, USER_MENTOR_FOLLOWS};
    use crate::test_support::{mentor_row, send, TestApp, TOKEN};

    fn seed(app: &TestApp) -> (Value, Value) {
        let a = mentor_row("Grace Hopper", "journey", "2024-01-01T00:00:00Z");
        let b = mentor_row("Satya Nadella", "quotes", "2024-02-01T00:00:00Z");
        app.store.seed(MENTORS, vec![b.clone(), a.clone()]);
        app.store.seed(
            USER_MENTOR_FOLLOWS,
            vec![json!({"id": Uuid::new_v4(), "user_id": app.user_id, "mentor_id": a["id"]})],
        );
        (a, b)
    }

    #[tokio::test]
    async fn test_list_marks_followed_in_catalogue_order() {
        let app = TestApp::new();
        seed(&app);
        let (status, body) =
            send(app.router(), Method::GET, "/api/v1/mentors", Some(TOKEN), None).await;
        assert_eq!(status, 200);
        let mentors = body["data"]["mentors"].as_array().unwrap();
        assert_eq!(mentors[0]["name"], "Grace Hopper");
        assert_eq!(mentors[0]["is_followed"], true);
        assert_eq!(mentors[1]["is_followed"], false);
        assert_eq!(body["data"]["counts"]["quotes"], 1);
    }

    #[tokio::test]
    async fn test_filter_by_category_and_search() {
        let app = TestApp::new();
        seed(&app);
        let (_, body) = send(
            app.router(),
            Method::GET,
            "/api/v1/mentors?category=quotes",
            Some(TOKEN),
            None,
        )
        .await;
        assert_eq!(body["data"]["mentors"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["mentors"][0]["name"], "Satya Nadella");

        let (_, body) = send(
            app.router(),
            Method::GET,
            "/api/v1/mentors?search=HOPPER",
            Some(TOKEN),
            None,
        )
        .await;
        assert_eq!(body["data"]["mentors"][0]["name"], "Grace Hopper");
        assert_eq!(body["data"]["counts"]["all"], 2);
    }
}
