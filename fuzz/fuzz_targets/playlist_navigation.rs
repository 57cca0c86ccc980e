#![no_main]

use dirplay::playlist::PlaylistSession;
use libfuzzer_sys::fuzz_target;
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    let mut session = PlaylistSession::with_seed(data.len() as u64);
    let len = data.first().map_or(1, |byte| usize::from(*byte % 32)).max(1);
    let view: Vec<PathBuf> = (0..len)
        .map(|idx| PathBuf::from(format!("track_{idx}.mp3")))
        .collect();
    let mut shuffle = false;

    for byte in data {
        match byte % 7 {
            0 => {
                let selected = &view[usize::from(*byte) % len];
                let _ = session.start_at(&view, selected, shuffle);
            }
            1 => {
                let _ = session.next();
            }
            2 => {
                let _ = session.previous();
            }
            3 => {
                let _ = session.advance_after_completion();
            }
            4 => {
                let _ = session.shuffle_from(&view);
            }
            5 => {
                shuffle = !shuffle;
                let playing = session.current().map(PathBuf::from);
                session.reorder(&view, shuffle, playing.as_deref());
                assert_eq!(session.current().map(PathBuf::from), playing);
            }
            _ => session.detach(),
        }
        if let Some(idx) = session.index() {
            assert!(idx < session.tracks().len());
        }
    }
});
