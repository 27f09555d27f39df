//! Browser runtime for catalogue panels.
//!
//! Generates `shelf.js`, the script that attaches the expand/collapse
//! handlers described by [`crate::panel::PanelBinding`] using the page's
//! jQuery/Bootstrap collapse plugin, and optionally listens for live paints
//! from the dev server.

use crate::panel::{js_string, Chevron, SCROLL_DURATION};

/// Generate the panel runtime script.
///
/// `container_prefix` is the prefix of catalogue container ids. When
/// `live_path` is set the script also connects to the WebSocket at that path
/// on the serving host and applies `paint` messages to the page.
pub fn runtime_script(container_prefix: &str, live_path: Option<&str>) -> String {
    let live = live_path.map(live_channel).unwrap_or_default();

    format!(
        r#"
(function() {{
  'use strict';

  var PREFIX = {prefix};
  var SCROLL_MS = {scroll_ms};

  function bind(tag, id, show) {{
    var $ = window.jQuery;
    if (!$) {{
      console.warn('[docshelf] jQuery is not loaded, panel ' + id + ' stays static');
      return;
    }}
    var body = $('#' + id + '1');
    body.off('shown.bs.collapse hidden.bs.collapse');
    body.on('shown.bs.collapse', function () {{
      $('#' + id + ' i.indicator').removeClass('{up}').addClass('{down}');
      var top = $('#' + PREFIX + '-' + tag).offset().top;
      $('html, body').animate({{ scrollTop: top }}, SCROLL_MS);
    }});
    body.on('hidden.bs.collapse', function () {{
      $('#' + id + ' i.indicator').removeClass('{down}').addClass('{up}');
    }});
    if (show === true) {{
      body.collapse('show');
    }}
  }}

  function paint(msg) {{
    var el = document.getElementById(PREFIX + '-' + msg.tag);
    if (!el) {{
      return;
    }}
    el.innerHTML = msg.html;
    bind(msg.tag, msg.panel_id, msg.show);
  }}

  window.docshelf = {{ bind: bind, paint: paint }};
{live}}})();
"#,
        prefix = js_string(container_prefix),
        scroll_ms = SCROLL_DURATION.as_millis(),
        up = Chevron::Up.class(),
        down = Chevron::Down.class(),
        live = live,
    )
}

fn live_channel(path: &str) -> String {
    format!(
        r#"
  var scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var ws = new WebSocket(scheme + location.host + {path});

  ws.onmessage = function(event) {{
    var msg = JSON.parse(event.data);
    switch (msg.type) {{
      case 'paint':
        paint(msg);
        break;

      case 'reload':
        location.reload();
        break;

      case 'connected':
        console.log('[docshelf] Live updates connected');
        break;
    }}
  }};

  ws.onclose = function() {{
    console.log('[docshelf] Live updates disconnected');
  }};
"#,
        path = js_string(path)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wires_collapse_handlers() {
        let js = runtime_script("rtems-catalogue", None);

        assert!(js.contains(r#"var PREFIX = "rtems-catalogue";"#));
        assert!(js.contains("var SCROLL_MS = 500;"));
        assert!(js.contains("shown.bs.collapse"));
        assert!(js.contains("hidden.bs.collapse"));
        assert!(js.contains("removeClass('glyphicon-chevron-up').addClass('glyphicon-chevron-down')"));
        assert!(js.contains("window.docshelf = { bind: bind, paint: paint };"));
        assert!(!js.contains("WebSocket"));
    }

    #[test]
    fn adds_live_channel_when_requested() {
        let js = runtime_script("cat", Some("/__shelf"));

        assert!(js.contains(r#"new WebSocket(scheme + location.host + "/__shelf")"#));
        assert!(!js.contains("127.0.0.1"));
        assert!(js.contains("case 'paint':"));
    }
}
