//! Micropost entity <-> model mapper

use microblog_core::entities::Micropost;
use microblog_core::value_objects::{MicropostId, UserId};

use crate::models::MicropostModel;

impl From<MicropostModel> for Micropost {
    fn from(model: MicropostModel) -> Self {
        Micropost {
            id: MicropostId::new(model.id),
            user_id: UserId::new(model.user_id),
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
