//! Spine Clusterer
//!
//! Groups positioned fragments into vertical strips, one per book spine.
//! Fragments are swept left to right by horizontal center; a fragment joins
//! the open cluster when its center is within `proximity_px` of the last
//! fragment added to it, so a cluster may drift across a slanted spine.

use std::cmp::Ordering;

use super::types::{PositionedFragment, SpineCluster};

/// Default horizontal proximity, calibrated for close-range phone photos
pub const DEFAULT_PROXIMITY_PX: f64 = 80.0;

/// Clusters shorter than this (joined and trimmed) are OCR noise
pub const MIN_CLUSTER_TEXT_LEN: usize = 3;

/// Group fragments into spine clusters ordered left to right
pub fn cluster_fragments(fragments: &[PositionedFragment], proximity_px: f64) -> Vec<SpineCluster> {
    if fragments.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(f64, &PositionedFragment)> = fragments
        .iter()
        .map(|fragment| (fragment.bounds.center_x(), fragment))
        .collect();
    // Ties fall back to position and text so input order never matters
    sorted.sort_by(|(a_center, a), (b_center, b)| {
        a_center
            .total_cmp(b_center)
            .then_with(|| a.bounds.y.total_cmp(&b.bounds.y))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut groups: Vec<Vec<&PositionedFragment>> = Vec::new();
    let mut current: Vec<&PositionedFragment> = Vec::new();
    let mut last_center = f64::NAN;

    for (center, fragment) in sorted {
        if !current.is_empty() && (center - last_center).abs() > proximity_px {
            groups.push(std::mem::take(&mut current));
        }
        current.push(fragment);
        last_center = center;
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| top_to_bottom(a, b));
            SpineCluster::new(group.into_iter().map(|f| f.text.clone()).collect())
        })
        .filter(|cluster| cluster.joined().chars().count() >= MIN_CLUSTER_TEXT_LEN)
        .collect()
}

fn top_to_bottom(a: &PositionedFragment, b: &PositionedFragment) -> Ordering {
    a.bounds
        .y
        .total_cmp(&b.bounds.y)
        .then_with(|| a.bounds.x.total_cmp(&b.bounds.x))
        .then_with(|| a.text.cmp(&b.text))
}
