use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mentors::repo;
use crate::models::mentor::Mentor;
use crate::response::DataResponse;
use crate::state::AppState;

pub const ERROR_CODE: &str = "MENTOR_ACTIVITIES_ERROR";

const MAX_ACTIVITIES: usize = 10;

const POST_TEMPLATES: [&str; 10] = [
    "Just finished an amazing discussion about the future of AI. The possibilities are endless!",
    "Excited to share our latest breakthrough in machine learning. Innovation never stops.",
    "Reflecting on the journey from startup to where we are today. Persistence pays off.",
    "The key to success in tech: stay curious, keep learning, and never fear failure.",
    "Working on some groundbreaking projects that will reshape how we think about technology.",
    "Grateful for the incredible team that makes the impossible possible every day.",
    "The future belongs to those who can adapt and innovate in the face of change.",
    "Just had an inspiring conversation with young entrepreneurs. The next generation is brilliant!",
    "Building technology that serves humanity is not just our goal, it's our responsibility.",
    "Sometimes the best ideas come from the most unexpected places. Stay open to possibilities.",
];

#[derive(Debug, Clone, Serialize)]
pub struct MentorActivity {
    pub id: String,
    pub mentor_name: String,
    pub mentor_title: Option<String>,
    pub mentor_avatar: Option<String>,
    pub twitter_handle: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub likes: u32,
    pub retweets: u32,
    pub replies: u32,
}

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<MentorActivity>,
    pub followed_mentors_count: usize,
}

/// One templated post per mentor, stamped within the last 24 hours,
/// newest first, capped at ten.
pub fn generate_activities<R: Rng>(
    mentors: &[Mentor],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<MentorActivity> {
    let mut activities: Vec<MentorActivity> = mentors
        .iter()
        .map(|mentor| {
            let handle = mentor
                .twitter_handle
                .clone()
                .unwrap_or_else(|| mentor.id.to_string());
            let content = POST_TEMPLATES
                .choose(rng)
                .copied()
                .unwrap_or(POST_TEMPLATES[0]);
            MentorActivity {
                id: format!("{handle}-1"),
                mentor_name: mentor.name.clone(),
                mentor_title: mentor.title.clone(),
                mentor_avatar: mentor.avatar_url.clone(),
                twitter_handle: mentor.twitter_handle.clone(),
                content: content.to_string(),
                timestamp: now - Duration::milliseconds(rng.gen_range(0..86_400_000)),
                likes: rng.gen_range(50..1050),
                retweets: rng.gen_range(10..310),
                replies: rng.gen_range(5..105),
            }
        })
        .collect();

    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities.truncate(MAX_ACTIVITIES);
    activities
}

/// POST /functions/v1/mentor-activities
pub async fn handle_mentor_activities(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DataResponse<ActivitiesResponse>>, AppError> {
    let store = state.store.as_ref();
    let follows = repo::list_follows(store, user.id())
        .await
        .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;
    let ids: Vec<_> = follows.iter().map(|f| f.mentor_id).collect();
    let mentors = repo::list_mentors_by_id(store, &ids)
        .await
        .map_err(|e| AppError::from(e).in_handler(ERROR_CODE))?;

    let activities = generate_activities(&mentors, Utc::now(), &mut rand::thread_rng());

    Ok(DataResponse::json(ActivitiesResponse {
        activities,
        followed_mentors_count: follows.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::tables::{MENTORS, USER_MENTOR_FOLLOWS};
    use crate::test_support::{mentor_row, send, TestApp, TOKEN};

    fn mentor(n: usize) -> Mentor {
        Mentor {
            id: Uuid::new_v4(),
            name: format!("Mentor {n}"),
            title: Some("CEO".into()),
            bio: None,
            twitter_handle: Some(format!("mentor{n}")),
            avatar_url: None,
            category: Some("quotes".into()),
            created_at: None,
        }
    }

    #[test]
    fn test_generated_values_in_range() {
        let now = Utc::now();
        let mentors: Vec<Mentor> = (0..4).map(mentor).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let activities = generate_activities(&mentors, now, &mut rng);
        assert_eq!(activities.len(), 4);
        for a in &activities {
            assert!((50..1050).contains(&a.likes));
            assert!((10..310).contains(&a.retweets));
            assert!((5..105).contains(&a.replies));
            assert!(a.timestamp <= now && a.timestamp > now - Duration::hours(24));
            assert!(POST_TEMPLATES.contains(&a.content.as_str()));
        }
        assert!(activities.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_capped_at_ten() {
        let mentors: Vec<Mentor> = (0..14).map(mentor).collect();
        let activities = generate_activities(&mentors, Utc::now(), &mut StdRng::seed_from_u64(1));
        assert_eq!(activities.len(), 10);
    }

    #[tokio::test]
    async fn test_only_followed_mentors() {
        let app = TestApp::new();
        let followed = mentor_row("Grace Hopper", "journey", "2024-01-01T00:00:00Z");
        let other = mentor_row("Satya Nadella", "quotes", "2024-01-02T00:00:00Z");
        app.store.seed(MENTORS, vec![followed.clone(), other]);
        app.store.seed(
            USER_MENTOR_FOLLOWS,
            vec![json!({"user_id": app.user_id, "mentor_id": followed["id"]})],
        );

        let (status, body) = send(
            app.router(),
            Method::POST,
            "/functions/v1/mentor-activities",
            Some(TOKEN),
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["followed_mentors_count"], 1);
        assert_eq!(body["data"]["activities"][0]["mentor_name"], "Grace Hopper");
    }
}
