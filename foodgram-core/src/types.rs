pub type UserId = i32;
pub type RecipeId = i32;

/// Who is making the request.
///
/// Every core operation that depends on the requesting user takes a `Viewer`
/// argument rather than reading it from request-global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(UserId),
}

impl Viewer {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }
}

impl From<Option<UserId>> for Viewer {
    fn from(id: Option<UserId>) -> Self {
        match id {
            Some(id) => Viewer::User(id),
            None => Viewer::Anonymous,
        }
    }
}
