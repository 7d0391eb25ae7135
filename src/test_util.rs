#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    let old_base = std::env::var("CAPTION_FRAME_DIR").ok();
    unsafe {
        std::env::set_var("HOME", dir.path());
        std::env::remove_var("CAPTION_FRAME_DIR");
    }
    let result = func(dir.path());
    unsafe {
        match old_home {
            Some(old) => std::env::set_var("HOME", old),
            None => std::env::remove_var("HOME"),
        }
        if let Some(old) = old_base {
            std::env::set_var("CAPTION_FRAME_DIR", old);
        }
    }
    result
}

#[cfg(test)]
pub(crate) const DEJAVU_SANS: &[u8] = include_bytes!("../tests/assets/DejaVuSans.ttf");

/// Same family without Hebrew, Thai or CJK outlines.
#[cfg(test)]
pub(crate) const DEJAVU_SANS_MONO: &[u8] = include_bytes!("../tests/assets/DejaVuSansMono.ttf");

#[cfg(test)]
pub(crate) fn test_font(data: &[u8]) -> crate::render::FontFace {
    crate::render::FontFace::from_data(data.to_vec()).expect("bundled test font")
}
