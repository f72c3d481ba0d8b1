//! Rules for the tracing recorder module (`tracing.js`).
//!
//! The markers are verbatim lines from the compiled recorder and form an
//! implicit contract with a specific range of library versions.

use std::path::{Path, PathBuf};

use crate::core::rule::{Replacement, Rule, RuleSet};
use crate::error::PatchError;

pub const TARGET: &str = "tracing.js";

/// Present only once the WebSocket hooks have been injected.
pub const SENTINEL: &str = "_startWebSocketTracing";

pub const IMPORT_MARKER: &str = r#"var import_page = require("../../page");"#;
pub const NETWORK_IMPORT: &str = r#"var import_network = require("../../network");"#;
pub const ALLOCATE_MARKER: &str = "_allocateNewTraceFile(state) {";

/// Tolerates any whitespace between the start and return statements.
const START_CHUNK_PATTERN: &str = r"await this\._snapshotter\?\.start\(\);\s*\n\s*return \{ traceName: this\._state\.traceName \};";

const START_CHUNK_REPLACEMENT: &str = "await this._snapshotter?.start();
    this._startWebSocketTracing();
    return { traceName: this._state.traceName };";

const WS_TRACING_METHODS: &str = r#"
  _startWebSocketTracing() {
    if (!(this._context instanceof import_browserContext.BrowserContext))
      return;
    for (const page of this._context.pages())
      this._startWebSocketTracingInPage(page);
    this._eventListeners.push(
      import_eventsHelper.eventsHelper.addEventListener(this._context, import_browserContext.BrowserContext.Events.Page, this._startWebSocketTracingInPage.bind(this))
    );
  }
  _startWebSocketTracingInPage(page) {
    this._eventListeners.push(
      import_eventsHelper.eventsHelper.addEventListener(page, import_page.Page.Events.WebSocket, (ws) => {
        this._onWebSocketCreated(ws, page);
      })
    );
  }
  _onWebSocketCreated(ws, page) {
    const wsGuid = ws.guid;
    const event = {
      type: "websocket-created",
      wsGuid,
      timestamp: (0, import_time.monotonicTime)(),
      url: ws.url(),
      pageId: page.guid
    };
    this._appendTraceEvent(event);
    const frameListener = (frameEvent, direction) => {
      const frameTraceEvent = {
        type: "websocket-frame",
        wsGuid,
        timestamp: (0, import_time.monotonicTime)(),
        opcode: frameEvent.opcode,
        data: frameEvent.data,
        direction
      };
      this._appendTraceEvent(frameTraceEvent);
    };
    this._eventListeners.push(
      import_eventsHelper.eventsHelper.addEventListener(ws, import_network.WebSocket.Events.FrameSent, (e) => frameListener(e, "sent")),
      import_eventsHelper.eventsHelper.addEventListener(ws, import_network.WebSocket.Events.FrameReceived, (e) => frameListener(e, "received")),
      import_eventsHelper.eventsHelper.addEventListener(ws, import_network.WebSocket.Events.SocketError, (error) => {
        const errorEvent = {
          type: "websocket-error",
          wsGuid,
          timestamp: (0, import_time.monotonicTime)(),
          error
        };
        this._appendTraceEvent(errorEvent);
      }),
      import_eventsHelper.eventsHelper.addEventListener(ws, import_network.WebSocket.Events.Close, () => {
        const closeEvent = {
          type: "websocket-closed",
          wsGuid,
          timestamp: (0, import_time.monotonicTime)()
        };
        this._appendTraceEvent(closeEvent);
      })
    );
  }
"#;

/// Location of the recorder module inside an installation root.
pub fn tracing_path(root: &Path) -> PathBuf {
    root.join("lib")
        .join("server")
        .join("trace")
        .join("recorder")
        .join("tracing.js")
}

/// All three rules are required: a partial hook would record nothing.
pub fn rule_set() -> Result<RuleSet, PatchError> {
    Ok(RuleSet {
        sentinel: SENTINEL.to_string(),
        rules: vec![
            Rule::literal(
                "import_page",
                IMPORT_MARKER,
                Replacement::Text(format!("{IMPORT_MARKER}\n{NETWORK_IMPORT}")),
            ),
            Rule::pattern(
                "startChunk return statement",
                START_CHUNK_PATTERN,
                Replacement::Text(START_CHUNK_REPLACEMENT.to_string()),
            )?,
            Rule::literal(
                "_allocateNewTraceFile",
                ALLOCATE_MARKER,
                Replacement::Text(format!("{WS_TRACING_METHODS}\n  {ALLOCATE_MARKER}")),
            ),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::{apply_rules, is_patched};

    const SAMPLE: &str = r#"var import_page = require("../../page");
class Tracing {
  async startChunk(progress, options = {}) {
    await this._snapshotter?.start();
    return { traceName: this._state.traceName };
  }
  _allocateNewTraceFile(state) {
  }
}
"#;

    #[test]
    fn rule_set_injects_import_call_and_methods() {
        let set = rule_set().expect("rules");
        let transform = apply_rules(SAMPLE, &set.rules).expect("transform");
        let out = transform.content;
        assert!(out.contains(&format!("{IMPORT_MARKER}\n{NETWORK_IMPORT}")));
        assert!(out.contains(
            "await this._snapshotter?.start();\n    this._startWebSocketTracing();\n    return"
        ));
        assert!(out.contains("_onWebSocketCreated(ws, page) {"));
        assert!(out.find("_startWebSocketTracing() {") < out.find(ALLOCATE_MARKER));
        assert!(is_patched(&out, SENTINEL));
        assert!(!is_patched(SAMPLE, SENTINEL));
    }

    #[test]
    fn start_chunk_pattern_tolerates_extra_whitespace() {
        let content = "await this._snapshotter?.start();   \n\n\t\treturn { traceName: this._state.traceName };";
        let set = rule_set().expect("rules");
        assert!(matches!(
            set.rules[1].apply(content),
            crate::core::rule::RuleOutcome::Applied(_)
        ));
    }

    #[test]
    fn tracing_path_points_at_recorder() {
        let path = tracing_path(Path::new("/pw"));
        assert!(path.ends_with("lib/server/trace/recorder/tracing.js"));
    }
}
