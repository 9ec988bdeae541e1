pub mod expression;
pub mod humanoid;
pub mod model;

pub use expression::{EXPRESSION_CATALOG, ExpressionController, ExpressionPreset};
pub use model::{Avatar, AvatarNode, NodeKey};
