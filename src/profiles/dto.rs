use serde::Serialize;
use sqlx::PgPool;

use crate::profiles::repo;
use crate::profiles::repo_types::Profile;

/// Profile payloads are wrapped under a "profile" key.
#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub profile: ProfileView,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl ProfileView {
    /// Render a profile as seen by an optional viewer; `following` is
    /// false for anonymous readers.
    pub async fn for_viewer(
        db: &PgPool,
        profile: &Profile,
        viewer_id: Option<i64>,
    ) -> anyhow::Result<Self> {
        let following = match viewer_id {
            Some(viewer_id) => repo::is_following(db, viewer_id, profile.user_id).await?,
            None => false,
        };
        Ok(Self {
            username: profile.username.clone(),
            bio: profile.bio.clone(),
            image: profile.image.clone(),
            following,
        })
    }
}
