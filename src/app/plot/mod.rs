mod interaction;
mod tooltip;
mod view;

pub(super) use interaction::Interaction;
