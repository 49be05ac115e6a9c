//! Relationship entity <-> model mapper

use microblog_core::entities::Relationship;
use microblog_core::value_objects::UserId;

use crate::models::RelationshipModel;

impl From<RelationshipModel> for Relationship {
    fn from(model: RelationshipModel) -> Self {
        Relationship {
            follower_id: UserId::new(model.follower_id),
            followed_id: UserId::new(model.followed_id),
            created_at: model.created_at,
        }
    }
}
