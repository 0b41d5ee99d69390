use log::{debug, info, warn};
use resvg::usvg::{self, fontdb};
use std::path::PathBuf;
use std::sync::Arc;

/// Sans faces tried, in order, when no candidate file loads.
pub const SYSTEM_SANS_FAMILIES: [&str; 5] = [
    "Helvetica",
    "Arial",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
];

/// Font used to draw the label on raster icons.
///
/// Resolution is best effort and never fails: the first candidate file that
/// loads wins, then the first installed face of [`SYSTEM_SANS_FAMILIES`] (or
/// whatever fontdb maps to sans-serif), then any system face at all.
/// With no fonts available the label is simply not drawn.
#[derive(Clone)]
pub struct LabelFont {
    db: Arc<fontdb::Database>,
    family: Option<String>,
}

impl LabelFont {
    pub fn resolve(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            let mut db = fontdb::Database::new();
            if let Err(e) = db.load_font_file(path) {
                debug!("font candidate {} unusable: {e}", path.display());
                continue;
            }
            match first_family(&db) {
                Some(family) => {
                    info!("using font {} ({family})", path.display());
                    return Self {
                        db: Arc::new(db),
                        family: Some(family),
                    };
                }
                None => debug!("font candidate {} has no faces", path.display()),
            }
        }

        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let family = system_sans_family(&mut db).or_else(|| first_family(&db));

        match &family {
            Some(name) => warn!("no candidate font could be loaded, falling back to system font {name}"),
            None => warn!("no fonts available, raster icons will be drawn without a label"),
        }

        Self {
            db: Arc::new(db),
            family,
        }
    }

    /// A font that draws nothing.
    pub fn none() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
            family: None,
        }
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub(crate) fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: Arc::clone(&self.db),
            font_family: self.family.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("family", &self.family)
            .field("faces", &self.db.len())
            .finish()
    }
}

/// Point the generic sans-serif family at the first known sans face that is
/// installed, then resolve it.
fn system_sans_family(db: &mut fontdb::Database) -> Option<String> {
    let installed = SYSTEM_SANS_FAMILIES.iter().copied().find(|&name| {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(name)],
            ..Default::default()
        };
        db.query(&query).is_some()
    });
    if let Some(name) = installed {
        db.set_sans_serif_family(name);
    }

    let sans = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..Default::default()
    };
    let id = db.query(&sans)?;
    db.face(id)
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
}

fn first_family(db: &fontdb::Database) -> Option<String> {
    db.faces()
        .find_map(|face| face.families.first())
        .map(|(name, _)| name.clone())
}
