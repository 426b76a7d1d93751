use super::similarity;
use super::track::Track;
use crate::error::{PlayerError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Sort applied when a directory is (re)loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistOrder {
    #[default]
    Ascending,
    #[serde(alias = "descendant")]
    Descending,
    Random,
}

impl PlaylistOrder {
    pub fn next(self) -> Self {
        match self {
            PlaylistOrder::Ascending => PlaylistOrder::Descending,
            PlaylistOrder::Descending => PlaylistOrder::Random,
            PlaylistOrder::Random => PlaylistOrder::Ascending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaylistOrder::Ascending => "ascending",
            PlaylistOrder::Descending => "descending",
            PlaylistOrder::Random => "random",
        }
    }
}

/// Receives `(index, total)` with a 1-based index, `(0, 0)` for an empty list
pub type PositionCallback = Box<dyn FnMut(usize, usize)>;
pub type SelectCallback = Box<dyn FnMut(&Track)>;

/// Ordered, filterable track collection with a cursor.
///
/// `items` is always `unfiltered` filtered by `filter_pattern`. The cursor
/// indexes `items` and is `None` exactly when `items` is empty. The current
/// track is remembered by path so it survives filtering and reloads.
pub struct Tracklist {
    items: Vec<Arc<Track>>,
    unfiltered: Vec<Arc<Track>>,
    cursor: Option<usize>,
    current: Option<PathBuf>,
    order: PlaylistOrder,
    filter_pattern: Option<String>,
    rng: StdRng,
    on_position: Option<PositionCallback>,
    on_select: Option<SelectCallback>,
}

impl fmt::Debug for Tracklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracklist")
            .field("len", &self.items.len())
            .field("unfiltered_len", &self.unfiltered.len())
            .field("cursor", &self.cursor)
            .field("current", &self.current)
            .field("order", &self.order)
            .field("filter_pattern", &self.filter_pattern)
            .finish_non_exhaustive()
    }
}

fn matches_pattern(track: &Track, pattern_lower: &str) -> bool {
    track.name().to_lowercase().contains(pattern_lower)
}

impl Tracklist {
    pub fn new(order: PlaylistOrder) -> Self {
        Self::with_rng(order, StdRng::from_entropy())
    }

    /// Deterministic shuffles for tests and reproducible sessions
    pub fn with_seed(order: PlaylistOrder, seed: u64) -> Self {
        Self::with_rng(order, StdRng::seed_from_u64(seed))
    }

    fn with_rng(order: PlaylistOrder, rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            unfiltered: Vec::new(),
            cursor: None,
            current: None,
            order,
            filter_pattern: None,
            rng,
            on_position: None,
            on_select: None,
        }
    }

    pub fn set_on_position_changed(&mut self, callback: PositionCallback) {
        self.on_position = Some(callback);
    }

    pub fn set_on_select(&mut self, callback: SelectCallback) {
        self.on_select = Some(callback);
    }

    pub fn items(&self) -> &[Arc<Track>] {
        &self.items
    }

    pub fn unfiltered_items(&self) -> &[Arc<Track>] {
        &self.unfiltered
    }

    /// Full play order, ignoring any filter
    pub fn paths(&self) -> Vec<PathBuf> {
        self.unfiltered.iter().map(|t| t.path().to_path_buf()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn cursor_track(&self) -> Option<&Arc<Track>> {
        self.cursor.and_then(|c| self.items.get(c))
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// The committed track, found even while the filter hides it
    pub fn current_track(&self) -> Option<&Arc<Track>> {
        let current = self.current.as_deref()?;
        self.unfiltered.iter().find(|t| t.path() == current)
    }

    pub fn order(&self) -> PlaylistOrder {
        self.order
    }

    pub fn set_order(&mut self, order: PlaylistOrder) {
        self.order = order;
    }

    pub fn filter_pattern(&self) -> Option<&str> {
        self.filter_pattern.as_deref()
    }

    /// 1-based cursor position and displayed total, as shown in a status bar
    pub fn position(&self) -> (usize, usize) {
        (self.cursor.map_or(0, |c| c + 1), self.items.len())
    }

    fn notify_position(&mut self) {
        let (index, total) = self.position();
        if let Some(callback) = self.on_position.as_mut() {
            callback(index, total);
        }
    }

    fn clamp_cursor(&self, position: usize) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(position.min(self.items.len() - 1))
        }
    }

    fn sort_tracks(&mut self, tracks: &mut [Arc<Track>]) {
        match self.order {
            PlaylistOrder::Ascending => tracks.sort_by_cached_key(|t| t.stem()),
            PlaylistOrder::Descending => tracks.sort_by_cached_key(|t| Reverse(t.stem())),
            PlaylistOrder::Random => tracks.shuffle(&mut self.rng),
        }
    }

    /// Replace the whole list. Duplicate paths keep their first occurrence.
    pub fn set_tracks(&mut self, paths: Vec<PathBuf>, position: usize, sort: bool) {
        let mut seen = HashSet::new();
        let mut tracks: Vec<Arc<Track>> = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .map(|p| Arc::new(Track::new(p)))
            .collect();
        if sort {
            self.sort_tracks(&mut tracks);
        }

        self.unfiltered = tracks;
        self.items = self.unfiltered.clone();
        self.filter_pattern = None;
        self.cursor = self.clamp_cursor(position);

        info!(
            "Tracklist replaced: {} tracks (sorted={}, order={})",
            self.items.len(),
            sort,
            self.order.label()
        );
        self.notify_position();
    }

    /// Append new tracks; those hidden by the active filter only join the backing list
    pub fn add(&mut self, paths: Vec<PathBuf>) {
        let mut known: HashSet<PathBuf> = self.unfiltered.iter().map(|t| t.path().to_path_buf()).collect();
        let pattern = self.filter_pattern.as_ref().map(|p| p.to_lowercase());

        let mut added = 0;
        for path in paths {
            if !known.insert(path.clone()) {
                continue;
            }
            let track = Arc::new(Track::new(path));
            if pattern.as_deref().map_or(true, |p| matches_pattern(&track, p)) {
                self.items.push(Arc::clone(&track));
            }
            self.unfiltered.push(track);
            added += 1;
        }

        if self.cursor.is_none() {
            self.cursor = self.clamp_cursor(0);
        }

        info!("Added {} tracks ({} total)", added, self.unfiltered.len());
        self.notify_position();
    }

    /// Show only tracks whose file name contains `pattern`, ignoring case.
    /// The cursor resets to the top, or to the current track if it is still shown.
    pub fn filter(&mut self, pattern: &str) {
        if pattern.is_empty() {
            self.items = self.unfiltered.clone();
            self.filter_pattern = None;
        } else {
            let lower = pattern.to_lowercase();
            self.items = self
                .unfiltered
                .iter()
                .filter(|t| matches_pattern(t, &lower))
                .cloned()
                .collect();
            self.filter_pattern = Some(pattern.to_string());
        }

        self.cursor = self.clamp_cursor(0);
        if let Some(index) = self.current.as_deref().and_then(|c| self.index_of(c)) {
            self.cursor = Some(index);
        }

        info!("Applied filter {:?}: {} of {} tracks", pattern, self.items.len(), self.unfiltered.len());
        self.notify_position();
    }

    fn index_of(&self, path: &Path) -> Option<usize> {
        self.items.iter().position(|t| t.path() == path)
    }

    /// Move the cursor onto `path`; false when it is not displayed
    pub fn select(&mut self, path: &Path) -> bool {
        match self.index_of(path) {
            Some(index) => {
                self.cursor = Some(index);
                self.notify_position();
                true
            }
            None => false,
        }
    }

    /// Jump to the first name containing `pattern`, or else to the closest name
    pub fn search(&mut self, pattern: &str) {
        if pattern.is_empty() || self.items.is_empty() {
            return;
        }

        let lower = pattern.to_lowercase();
        let index = self
            .items
            .iter()
            .position(|t| matches_pattern(t, &lower))
            .unwrap_or_else(|| {
                let mut best = (0, f64::MIN);
                for (index, track) in self.items.iter().enumerate() {
                    let score = similarity::ratio(&track.name(), pattern);
                    if score > best.1 {
                        best = (index, score);
                    }
                }
                debug!("No name contains {:?}, closest match scored {:.2}", pattern, best.1);
                best.0
            });

        self.cursor = Some(index);
        self.notify_position();
    }

    /// 1-based jump, clamped into the list
    pub fn go_to(&mut self, position: i64) {
        if self.items.is_empty() {
            return;
        }
        let index = if position <= 0 {
            0
        } else {
            (position as usize - 1).min(self.items.len() - 1)
        };
        self.cursor = Some(index);
        self.notify_position();
    }

    /// `go_to` for raw user input
    pub fn go_to_input(&mut self, input: &str) -> Result<()> {
        let position = input
            .trim()
            .parse::<i64>()
            .map_err(|_| PlayerError::Validation(format!("'{}' is not a track position", input.trim())))?;
        self.go_to(position);
        Ok(())
    }

    /// Move without wrapping; false when already pinned at the boundary
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let last = self.items.len() as isize - 1;
        let target = (cursor as isize + delta).clamp(0, last) as usize;
        if target == cursor {
            return false;
        }
        self.cursor = Some(target);
        self.notify_position();
        true
    }

    /// Commit the cursor track as the one to play
    pub fn select_cursor(&mut self) -> Option<Arc<Track>> {
        let track = Arc::clone(self.cursor_track()?);
        info!("Selecting song {}", track.path().display());
        self.current = Some(track.path().to_path_buf());

        if let Some(callback) = self.on_select.as_mut() {
            callback(track.as_ref());
        }
        self.notify_position();
        Some(track)
    }

    /// Step down and commit; `None` at the end of the list
    pub fn next_song(&mut self) -> Option<Arc<Track>> {
        if self.move_cursor(1) {
            self.select_cursor()
        } else {
            None
        }
    }

    /// Step up and commit; `None` at the top of the list
    pub fn previous_song(&mut self) -> Option<Arc<Track>> {
        if self.move_cursor(-1) {
            self.select_cursor()
        } else {
            None
        }
    }

    /// Exchange the cursor track with the one at `target` (0-based, clamped).
    /// The cursor follows the moved track, and the backing list is updated
    /// the same way so the new order survives clearing the filter.
    pub fn swap(&mut self, target: isize) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let last = self.items.len() - 1;
        let new_index = if (cursor as isize) < target {
            (target as usize).min(last)
        } else {
            target.max(0) as usize
        };
        if new_index == cursor {
            return;
        }

        let moved = Arc::clone(&self.items[cursor]);
        let displaced = Arc::clone(&self.items[new_index]);
        self.items.swap(cursor, new_index);

        let backing_moved = self.unfiltered.iter().position(|t| Arc::ptr_eq(t, &moved));
        let backing_displaced = self.unfiltered.iter().position(|t| Arc::ptr_eq(t, &displaced));
        if let (Some(a), Some(b)) = (backing_moved, backing_displaced) {
            self.unfiltered.swap(a, b);
        }

        debug!("Moved {} from {} to {}", moved.name(), cursor + 1, new_index + 1);
        self.cursor = Some(new_index);
        self.notify_position();
    }

    /// Drop the cursor track from the list (the file is left alone)
    pub fn delete_current(&mut self) -> Option<Arc<Track>> {
        let cursor = self.cursor?;
        let removed = self.items.remove(cursor);
        self.unfiltered.retain(|t| !Arc::ptr_eq(t, &removed));

        if self.current.as_deref() == Some(removed.path()) {
            self.current = None;
        }
        self.cursor = self.clamp_cursor(cursor);

        info!("Removed {} from tracklist", removed.path().display());
        self.notify_position();
        Some(removed)
    }

    /// Re-apply `order` to every track, keeping the current track under the cursor.
    ///
    /// The existing tracks are reordered, so decoded metadata and an active
    /// filter both survive.
    pub fn resort(&mut self) {
        let mut tracks = std::mem::take(&mut self.unfiltered);
        self.sort_tracks(&mut tracks);
        self.unfiltered = tracks;

        let pattern = self.filter_pattern.clone().unwrap_or_default();
        self.filter(&pattern);
        info!("Tracklist resorted (order={})", self.order.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/music/{n}"))).collect()
    }

    fn names(list: &Tracklist) -> Vec<String> {
        list.items().iter().map(|t| t.name()).collect()
    }

    fn list_of(names: &[&str]) -> Tracklist {
        let mut list = Tracklist::with_seed(PlaylistOrder::Ascending, 7);
        list.set_tracks(paths(names), 0, false);
        list
    }

    #[test]
    fn set_tracks_clamps_the_cursor() {
        let mut list = Tracklist::new(PlaylistOrder::Ascending);
        for (position, expected) in [(0, 0), (2, 2), (4, 4), (5, 4), (99, 4)] {
            list.set_tracks(paths(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"]), position, false);
            assert_eq!(list.cursor(), Some(expected));
        }

        list.set_tracks(Vec::new(), 3, false);
        assert_eq!(list.cursor(), None);
    }

    #[test]
    fn ascending_sort_orders_by_stem() {
        let mut list = Tracklist::new(PlaylistOrder::Ascending);
        list.set_tracks(paths(&["b.mp3", "a.mp3"]), 0, true);
        assert_eq!(names(&list), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn sort_is_case_sensitive_and_descending_reverses() {
        let mut list = Tracklist::new(PlaylistOrder::Ascending);
        list.set_tracks(paths(&["beta.mp3", "Alpha.mp3", "alpha.wav"]), 0, true);
        assert_eq!(names(&list), vec!["Alpha.mp3", "alpha.wav", "beta.mp3"]);

        list.set_order(PlaylistOrder::Descending);
        list.set_tracks(paths(&["beta.mp3", "Alpha.mp3", "alpha.wav"]), 0, true);
        assert_eq!(names(&list), vec!["beta.mp3", "alpha.wav", "Alpha.mp3"]);
    }

    #[test]
    fn random_order_is_reproducible_with_a_seed() {
        let input = paths(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3"]);
        let mut first = Tracklist::with_seed(PlaylistOrder::Random, 42);
        let mut second = Tracklist::with_seed(PlaylistOrder::Random, 42);
        first.set_tracks(input.clone(), 0, true);
        second.set_tracks(input, 0, true);

        assert_eq!(names(&first), names(&second));
        let mut sorted = names(&first);
        sorted.sort();
        assert_eq!(sorted, vec!["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut list = list_of(&["a.mp3", "b.mp3", "a.mp3"]);
        assert_eq!(names(&list), vec!["a.mp3", "b.mp3"]);

        list.add(paths(&["b.mp3", "c.mp3"]));
        assert_eq!(names(&list), vec!["a.mp3", "b.mp3", "c.mp3"]);
    }

    #[test]
    fn add_keeps_the_cursor() {
        let mut list = list_of(&["a.mp3", "b.mp3"]);
        list.go_to(2);
        list.add(paths(&["c.mp3"]));
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.len(), 3);

        let mut empty = Tracklist::new(PlaylistOrder::Ascending);
        empty.add(paths(&["x.mp3"]));
        assert_eq!(empty.cursor(), Some(0));
    }

    #[test]
    fn add_while_filtered_respects_the_filter() {
        let mut list = list_of(&["rock one.mp3", "jazz.mp3"]);
        list.filter("rock");
        list.add(paths(&["rock two.mp3", "blues.mp3"]));

        assert_eq!(names(&list), vec!["rock one.mp3", "rock two.mp3"]);
        assert_eq!(list.unfiltered_items().len(), 4);

        list.filter("");
        assert_eq!(names(&list), vec!["rock one.mp3", "jazz.mp3", "rock two.mp3", "blues.mp3"]);
    }

    #[test]
    fn filter_is_non_destructive() {
        let mut list = list_of(&["Alpha.mp3", "beta.mp3", "ALPHABET.mp3"]);
        list.filter("alpha");
        assert_eq!(names(&list), vec!["Alpha.mp3", "ALPHABET.mp3"]);
        assert_eq!(list.filter_pattern(), Some("alpha"));

        list.filter("");
        assert_eq!(list.items(), list.unfiltered_items());
        assert_eq!(list.filter_pattern(), None);
    }

    #[test]
    fn filter_without_matches_empties_the_view() {
        let mut list = list_of(&["a.mp3", "b.mp3"]);
        list.filter("zz");
        assert!(list.is_empty());
        assert_eq!(list.cursor(), None);
        assert_eq!(list.position(), (0, 0));

        // navigation on an empty view is inert
        assert!(!list.move_cursor(1));
        assert!(list.select_cursor().is_none());
        list.swap(1);
        list.go_to(3);
        list.search("a");
        assert!(list.delete_current().is_none());
        assert_eq!(list.unfiltered_items().len(), 2);
    }

    #[test]
    fn filter_keeps_the_current_track_under_the_cursor() {
        let mut list = list_of(&["one.mp3", "two.mp3", "three.mp3", "tone.mp3"]);
        list.go_to(4);
        list.select_cursor();

        list.filter("one");
        assert_eq!(names(&list), vec!["one.mp3", "tone.mp3"]);
        assert_eq!(list.cursor(), Some(1));

        list.filter("t");
        assert_eq!(list.cursor_track().unwrap().name(), "tone.mp3");

        list.filter("two");
        assert_eq!(list.cursor(), Some(0));
        assert_eq!(list.current_track().unwrap().name(), "tone.mp3");
    }

    #[test]
    fn search_prefers_substring_then_similarity() {
        let mut list = list_of(&["alpha.mp3", "bravo.mp3", "charlie.mp3", "Bravo live.mp3"]);

        list.search("BRAVO");
        assert_eq!(list.cursor(), Some(1));

        list.search("brvo");
        assert_eq!(list.cursor_track().unwrap().name(), "bravo.mp3");

        list.search("charly");
        assert_eq!(list.cursor_track().unwrap().name(), "charlie.mp3");
    }

    #[test]
    fn search_always_lands_on_a_valid_index() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        for pattern in ["", "#", "zzzzzzzzzzzz", "ü", "a.mp3 but longer", "."] {
            list.search(pattern);
            let cursor = list.cursor().unwrap();
            assert!(cursor < list.len());
        }

        // ties go to the first item
        list.go_to(3);
        list.search("@@@");
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn go_to_clamps_both_ends() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"]);
        list.go_to(0);
        assert_eq!(list.cursor(), Some(0));
        list.go_to(1000);
        assert_eq!(list.cursor(), Some(4));
        list.go_to(-3);
        assert_eq!(list.cursor(), Some(0));
        list.go_to(3);
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn go_to_input_rejects_non_numbers() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        list.go_to(2);

        assert!(matches!(list.go_to_input("two"), Err(PlayerError::Validation(_))));
        assert_eq!(list.cursor(), Some(1));

        list.go_to_input(" 3 ").unwrap();
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn cursor_does_not_wrap() {
        let mut list = list_of(&["a.mp3", "b.mp3"]);
        assert!(!list.move_cursor(-1));
        assert!(list.move_cursor(1));
        assert!(!list.move_cursor(1));
        assert_eq!(list.cursor(), Some(1));

        assert!(list.next_song().is_none());
        assert_eq!(list.previous_song().unwrap().name(), "a.mp3");
        assert!(list.previous_song().is_none());
    }

    #[test]
    fn cursor_moves_do_not_commit() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        list.select_cursor();
        list.move_cursor(2);
        assert_eq!(list.current_track().unwrap().name(), "a.mp3");

        let selected = list.select_cursor().unwrap();
        assert_eq!(selected.name(), "c.mp3");
        assert_eq!(list.current_path(), Some(Path::new("/music/c.mp3")));
    }

    #[test]
    fn swap_twice_restores_the_order() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
        list.go_to(2);

        list.swap(3);
        assert_eq!(names(&list), vec!["a.mp3", "d.mp3", "c.mp3", "b.mp3"]);
        assert_eq!(list.cursor(), Some(3));

        list.swap(1);
        assert_eq!(names(&list), vec!["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn swap_clamps_the_target() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        list.swap(-1);
        assert_eq!(names(&list), vec!["a.mp3", "b.mp3", "c.mp3"]);
        assert_eq!(list.cursor(), Some(0));

        list.swap(10);
        assert_eq!(names(&list), vec!["c.mp3", "b.mp3", "a.mp3"]);
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn swap_under_a_filter_survives_clearing_it() {
        let mut list = list_of(&["x1.mp3", "a.mp3", "x2.mp3", "b.mp3", "x3.mp3"]);
        list.filter("x");
        list.go_to(1);
        list.swap(2);
        assert_eq!(names(&list), vec!["x3.mp3", "x2.mp3", "x1.mp3"]);

        list.filter("");
        assert_eq!(names(&list), vec!["x3.mp3", "a.mp3", "x2.mp3", "b.mp3", "x1.mp3"]);
    }

    #[test]
    fn delete_current_keeps_the_cursor_in_range() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        list.go_to(3);
        list.select_cursor();

        let removed = list.delete_current().unwrap();
        assert_eq!(removed.name(), "c.mp3");
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.current_path(), None);
        assert_eq!(list.unfiltered_items().len(), 2);

        list.go_to(1);
        list.delete_current();
        assert_eq!(names(&list), vec!["b.mp3"]);
        assert_eq!(list.cursor(), Some(0));

        list.delete_current();
        assert_eq!(list.cursor(), None);
    }

    #[test]
    fn every_change_reports_the_position() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut list = Tracklist::new(PlaylistOrder::Ascending);
        list.set_on_position_changed(Box::new(move |index, total| sink.borrow_mut().push((index, total))));

        list.set_tracks(paths(&["a.mp3", "b.mp3", "c.mp3"]), 1, false);
        list.move_cursor(1);
        list.filter("a");
        list.add(paths(&["d.mp3"]));
        list.filter("");
        list.delete_current();
        list.filter("zz");

        assert_eq!(
            *seen.borrow(),
            vec![(2, 3), (3, 3), (1, 1), (1, 1), (1, 4), (1, 3), (0, 0)]
        );
    }

    #[test]
    fn selection_callback_sees_the_committed_track() {
        let picked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&picked);

        let mut list = list_of(&["a.mp3", "b.mp3"]);
        list.set_on_select(Box::new(move |track| sink.borrow_mut().push(track.name())));
        list.select_cursor();
        list.next_song();
        list.next_song();

        assert_eq!(*picked.borrow(), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn resort_keeps_the_current_track_selected() {
        let mut list = list_of(&["a.mp3", "b.mp3", "c.mp3"]);
        list.select_cursor();
        list.set_order(PlaylistOrder::Descending);
        list.resort();

        assert_eq!(names(&list), vec!["c.mp3", "b.mp3", "a.mp3"]);
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn resort_reuses_tracks_and_keeps_the_filter() {
        let mut list = list_of(&["alpha.mp3", "bravo.mp3", "charlie.mp3", "delta.mp3"]);
        let before: Vec<Arc<Track>> = list.items().to_vec();
        list.filter("l");
        list.set_order(PlaylistOrder::Descending);
        list.resort();

        assert_eq!(list.filter_pattern(), Some("l"));
        assert_eq!(names(&list), vec!["delta.mp3", "charlie.mp3", "alpha.mp3"]);
        assert_eq!(list.unfiltered_items().len(), 4);
        for track in list.items() {
            assert!(before.iter().any(|b| Arc::ptr_eq(b, track)));
        }

        list.filter("");
        assert_eq!(names(&list), vec!["delta.mp3", "charlie.mp3", "bravo.mp3", "alpha.mp3"]);
    }

    #[test]
    fn order_names_round_trip_through_serde() {
        let parsed: PlaylistOrder = serde_json::from_str("\"descendant\"").unwrap();
        assert_eq!(parsed, PlaylistOrder::Descending);
        assert_eq!(serde_json::to_string(&PlaylistOrder::Random).unwrap(), "\"random\"");
        assert_eq!(PlaylistOrder::Random.next(), PlaylistOrder::Ascending);
    }
}
