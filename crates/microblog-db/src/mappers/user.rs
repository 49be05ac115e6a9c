//! User entity <-> model mapper

use microblog_core::entities::User;
use microblog_core::value_objects::UserId;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            name: model.name,
            email: model.email,
            admin: model.admin,
            activated: model.activated,
            activated_at: model.activated_at,
            activation_digest: model.activation_digest,
            remember_digest: model.remember_digest,
            reset_digest: model.reset_digest,
            reset_sent_at: model.reset_sent_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
