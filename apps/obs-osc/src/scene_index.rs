//! Scene name <-> avatar parameter index.
//!
//! The index is a position in the scene list as OBS shows it, fetched fresh
//! every time. Nothing here is cached.

/// Sent when the current scene is not in the list. Never a valid position.
pub const UNKNOWN_SCENE: i32 = -1;

/// Position of `name` in `scenes`, or [`UNKNOWN_SCENE`].
pub fn index_of<S: AsRef<str>>(scenes: &[S], name: &str) -> i32 {
	scenes
		.iter()
		.position(|scene| scene.as_ref() == name)
		.and_then(|pos| i32::try_from(pos).ok())
		.unwrap_or(UNKNOWN_SCENE)
}

/// Scene at `index`; `None` for negative or out-of-range indices.
pub fn scene_at<S: AsRef<str>>(scenes: &[S], index: i32) -> Option<&str> {
	usize::try_from(index).ok().and_then(|i| scenes.get(i)).map(AsRef::as_ref)
}
