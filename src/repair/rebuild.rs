use crate::catalog_store::{InstrumentAlbumLink, InstrumentArtistLink};
use std::collections::{BTreeMap, BTreeSet};

/// Instrument caches derived from the link tables, keyed by target id.
///
/// Only targets with at least one link appear. Each value is sorted and
/// holds every instrument id once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseCaches {
    pub artist_instruments: BTreeMap<String, Vec<String>>,
    pub album_instruments: BTreeMap<String, Vec<String>>,
}

fn group<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (target_id, instrument_id) in pairs {
        grouped.entry(target_id).or_default().insert(instrument_id);
    }
    grouped
        .into_iter()
        .map(|(target_id, instruments)| {
            (
                target_id.to_string(),
                instruments.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

pub fn rebuild_reverse_caches(
    artist_links: &[InstrumentArtistLink],
    album_links: &[InstrumentAlbumLink],
) -> ReverseCaches {
    ReverseCaches {
        artist_instruments: group(
            artist_links
                .iter()
                .map(|l| (l.artist_id.as_str(), l.instrument_id.as_str())),
        ),
        album_instruments: group(
            album_links
                .iter()
                .map(|l| (l.album_id.as_str(), l.instrument_id.as_str())),
        ),
    }
}
