use crate::post::PostId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Image,
    Description,
}

impl FormField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "username" | "user" => Some(Self::Username),
            "image" | "img" => Some(Self::Image),
            "description" | "desc" => Some(Self::Description),
            _ => None,
        }
    }
}

/// A user gesture (or timer) the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Refresh,
    AutoRefresh,
    OpenForm,
    CancelForm,
    SetField(FormField, String),
    SubmitForm,
    Like(PostId),
    Share(PostId),
    ImageFailed(PostId),
}
