//! Frame filtering
//!
//! Prunes a simplified frame sequence down to the frames worth resolving:
//! the capturing code's own frames, opaque runtime internals, and dependency
//! internals all go. The call chain is kept down to and including the first
//! entry into dependency code; once that boundary has been crossed, no
//! further dependency frames survive. Single forward pass, one boolean of
//! state, idempotent.

use crate::frame::FrameSummary;

/// Marker for opaque runtime-internal modules whose source cannot be loaded.
const RUNTIME_INTERNAL: &str = "node:";

/// Marker for third-party dependency code.
const DEPENDENCY: &str = "node_modules";

fn is_internal(frame: &FrameSummary) -> bool {
    frame
        .file_name
        .as_deref()
        .is_some_and(|name| name.contains(RUNTIME_INTERNAL))
}

fn is_dependency(frame: &FrameSummary) -> bool {
    frame
        .file_name
        .as_deref()
        .is_some_and(|name| name.contains(DEPENDENCY))
}

/// Filter a frame sequence.
///
/// `self_file` is the file name of the capturing code itself (the snapshot's
/// own first frame, when the snapshot is the trace of record); frames from
/// that file are self-references and are dropped first.
#[must_use]
pub fn filter_frames(frames: &[FrameSummary], self_file: Option<&str>) -> Vec<FrameSummary> {
    let mut crossed_dependency_boundary = false;

    let mut kept: Vec<FrameSummary> = frames
        .iter()
        .filter(|frame| {
            if let (Some(own), Some(file)) = (self_file, frame.file_name.as_deref()) {
                if file == own {
                    return false;
                }
            }

            if is_internal(frame) {
                return false;
            }

            if is_dependency(frame) {
                if crossed_dependency_boundary {
                    return false;
                }
                crossed_dependency_boundary = true;
                return true;
            }

            true
        })
        .cloned()
        .collect();

    // If nothing but dependency frames survived, one representative is enough.
    if !kept.is_empty() && kept.iter().all(is_dependency) {
        kept.truncate(1);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(file: &str) -> FrameSummary {
        FrameSummary {
            file_name: Some(file.to_string()),
            line_number: Some(1),
            column_number: Some(0),
            ..FrameSummary::default()
        }
    }

    fn files(frames: &[FrameSummary]) -> Vec<&str> {
        frames.iter().filter_map(|f| f.file_name.as_deref()).collect()
    }

    #[test]
    fn drops_runtime_internals_and_dependency_internals() {
        let frames = vec![
            frame("/srv/app.js"),
            frame("/srv/node_modules/express/lib/router.js"),
            frame("/srv/node_modules/express/lib/layer.js"),
            frame("node:internal/modules/cjs/loader"),
        ];
        let kept = filter_frames(&frames, None);
        assert_eq!(
            files(&kept),
            vec!["/srv/app.js", "/srv/node_modules/express/lib/router.js"]
        );
    }

    #[test]
    fn keeps_only_first_of_leading_dependency_run() {
        let frames = vec![
            frame("/srv/node_modules/dep/a.js"),
            frame("/srv/node_modules/dep/b.js"),
            frame("/srv/app.js"),
        ];
        let kept = filter_frames(&frames, None);
        assert_eq!(files(&kept), vec!["/srv/node_modules/dep/a.js", "/srv/app.js"]);
    }

    #[test]
    fn dependency_frames_never_reappear_after_boundary() {
        let frames = vec![
            frame("/srv/app.js"),
            frame("/srv/node_modules/dep/a.js"),
            frame("/srv/handler.js"),
            frame("/srv/node_modules/other/b.js"),
        ];
        let kept = filter_frames(&frames, None);
        assert_eq!(
            files(&kept),
            vec!["/srv/app.js", "/srv/node_modules/dep/a.js", "/srv/handler.js"]
        );
    }

    #[test]
    fn all_dependency_stack_truncates_to_first() {
        let frames = vec![
            frame("/srv/node_modules/dep/a.js"),
            frame("/srv/node_modules/dep/b.js"),
            frame("/srv/node_modules/dep/c.js"),
        ];
        let kept = filter_frames(&frames, None);
        assert_eq!(files(&kept), vec!["/srv/node_modules/dep/a.js"]);
    }

    #[test]
    fn self_file_frames_are_dropped() {
        let frames = vec![
            frame("/srv/tracelight/capture.js"),
            frame("/srv/app.js"),
        ];
        let kept = filter_frames(&frames, Some("/srv/tracelight/capture.js"));
        assert_eq!(files(&kept), vec!["/srv/app.js"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let frames = vec![
            frame("/srv/node_modules/dep/a.js"),
            frame("/srv/node_modules/dep/b.js"),
            frame("/srv/app.js"),
            frame("node:internal/process/task_queues"),
            frame("/srv/node_modules/other/c.js"),
        ];
        let once = filter_frames(&frames, None);
        let twice = filter_frames(&once, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn frames_without_file_names_pass_through() {
        let anonymous = FrameSummary::default();
        let kept = filter_frames(std::slice::from_ref(&anonymous), None);
        assert_eq!(kept.len(), 1);
    }
}
