//! `POST /api/export/card`: render the open form as a PNG and download it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::card_image::icon::decode_or_skip;
use crate::card_image::{export_file_name, render_card_png};
use crate::roster::session::with_session;
use crate::routes::players::parse_player_form;
use crate::routes::util::{error_notice, parse_form_body};

/// Body: the edit form's fields. An empty `icon` falls back to the stored
/// player's icon so unsaved forms of existing players still export it.
///
/// Answers with a `<script>` that triggers the download, or a notice.
pub fn handle_card_post(body: &str) -> String {
    let params = parse_form_body(body);
    let mut snapshot = parse_player_form(&params);

    if snapshot.icon.is_empty() {
        if let Some(id) = snapshot.id {
            let stored = with_session(|s| s.players().find(id));
            match stored {
                Ok(Some(player)) => snapshot.icon = player.icon,
                Ok(None) => {}
                Err(e) => log::warn!("could not read stored icon for {id}: {e}"),
            }
        }
    }

    // A broken icon is dropped; the card falls back to the placeholder.
    let icon = decode_or_skip(&snapshot.icon);

    let png = match render_card_png(&snapshot, icon.as_ref()) {
        Ok(png) => png,
        Err(e) => {
            log::error!("card export failed: {e}");
            return error_notice("Could not create the image.");
        }
    };
    let file = export_file_name(&snapshot.name);
    log::info!("exported {file} ({} bytes)", png.len());

    format!(
        r#"<span class="text-emerald-600">Saved {file}</span><script>
(function() {{
  var a = document.createElement('a');
  a.href = 'data:image/png;base64,{data}';
  a.download = '{file}';
  document.body.appendChild(a);
  a.click();
  a.remove();
}})();
</script>"#,
        data = STANDARD.encode(&png),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_image::test_support::png_data_uri;
    use crate::roster::clock::FixedClock;
    use crate::roster::session::{Session, replace_session, reset_session};

    fn extract_png(html: &str) -> Vec<u8> {
        let start = html.find("base64,").unwrap() + "base64,".len();
        let end = start + html[start..].find('\'').unwrap();
        STANDARD.decode(&html[start..end]).unwrap()
    }

    #[test]
    fn export_downloads_named_png() {
        let html = handle_card_post("name=Endo+Mamoru&position=GK&memo=Captain");
        assert!(html.contains("a.download = 'Endo Mamoru.png'"));
        let png = extract_png(&html);
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 800));
    }

    #[test]
    fn unnamed_player_gets_default_file_name() {
        let html = handle_card_post("");
        assert!(html.contains("a.download = 'player.png'"));
    }

    #[test]
    fn broken_icon_still_exports() {
        let html = handle_card_post("name=X&icon=data%3Aimage%2Fpng%3Bbase64%2C%21%21");
        assert!(html.contains("a.download = 'X.png'"));
    }

    #[test]
    fn stored_icon_used_when_form_has_none() {
        replace_session(Session::new(Box::new(FixedClock(1_000))));
        let id = with_session(|s| {
            let mut endo = s.players().list().unwrap().remove(0);
            endo.icon = png_data_uri(4, 4, [255, 0, 0, 255]);
            let id = endo.id;
            let mut all = s.players().list().unwrap();
            all[0] = endo;
            s.players().save(&all).unwrap();
            id
        });
        let with_stored = extract_png(&handle_card_post(&format!("id={id}&name=Endo")));
        let without = extract_png(&handle_card_post("name=Endo"));
        assert_ne!(with_stored, without);
        reset_session();
    }
}
