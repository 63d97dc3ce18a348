//! Smooth expand/collapse of disclosure widgets.
//!
//! Every disclosure with both a summary and a content list gets an animator.
//! Clicking the summary toggles it with a height/opacity transition; clicking
//! a link embedded in the summary is left to navigate. Frames are sampled by
//! wall-clock time, so skipped or late ticks only affect smoothness.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::AnimationConfig;
use crate::page::{ElementId, Page};
use crate::render::{ContentStyle, MaxHeight, Overflow, VisualState};

/// Where inside a disclosure summary a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The summary itself, outside any embedded link
    Summary,
    /// The link embedded in the summary
    SummaryLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResult {
    /// Not intercepted: the default navigation applies
    Navigate(Option<String>),
    /// Open state toggled, transition started
    Toggled { opening: bool },
    /// No animator for this element
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Expanding { start: Instant },
    Collapsing { start: Instant, from: u32 },
}

/// Transition state of one disclosure.
#[derive(Debug, Clone)]
pub struct DisclosureAnimator {
    element: ElementId,
    link: Option<String>,
    /// Full content height in rows
    height: u32,
    open: bool,
    content: ContentStyle,
    phase: Phase,
}

impl DisclosureAnimator {
    fn new(element: ElementId, link: Option<String>, height: u32, open: bool) -> Self {
        let content = if open {
            ContentStyle::expanded()
        } else {
            ContentStyle::collapsed()
        };
        Self {
            element,
            link,
            height,
            open,
            content,
            phase: Phase::Idle,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Start collapsing when open (including mid-expand), expanding otherwise.
    fn toggle(&mut self, now: Instant) -> bool {
        if self.open {
            // Clamp to the current height so the transition has a start value;
            // the element stays open until the transition finishes
            let from = match self.content.max_height {
                MaxHeight::Px(px) => px,
                MaxHeight::None => self.height,
            };
            self.content = ContentStyle {
                max_height: MaxHeight::Px(from),
                opacity: self.content.opacity,
                overflow: Overflow::Hidden,
            };
            self.phase = Phase::Collapsing { start: now, from };
            false
        } else {
            self.open = true;
            self.content = ContentStyle {
                max_height: MaxHeight::Px(0),
                opacity: 0.0,
                overflow: Overflow::Hidden,
            };
            self.phase = Phase::Expanding { start: now };
            true
        }
    }

    /// Advance the transition to `now`.
    fn tick(&mut self, now: Instant, duration: Duration) {
        match self.phase {
            Phase::Idle => {}
            Phase::Expanding { start } => {
                let elapsed = now.saturating_duration_since(start);
                if elapsed >= duration {
                    self.content = ContentStyle {
                        max_height: MaxHeight::Px(self.height),
                        opacity: 1.0,
                        overflow: Overflow::Visible,
                    };
                    self.phase = Phase::Idle;
                } else {
                    let height = ease_out(progress(elapsed, duration));
                    let opacity = ease_out(progress(elapsed, opacity_duration(duration)));
                    self.content = ContentStyle {
                        max_height: MaxHeight::Px((self.height as f32 * height).round() as u32),
                        opacity,
                        overflow: Overflow::Hidden,
                    };
                }
            }
            Phase::Collapsing { start, from } => {
                let elapsed = now.saturating_duration_since(start);
                if elapsed >= duration {
                    self.open = false;
                    self.content = ContentStyle::collapsed();
                    self.phase = Phase::Idle;
                } else {
                    let height = 1.0 - ease_out(progress(elapsed, duration));
                    let opacity = 1.0 - ease_out(progress(elapsed, opacity_duration(duration)));
                    self.content = ContentStyle {
                        max_height: MaxHeight::Px((from as f32 * height).round() as u32),
                        opacity,
                        overflow: Overflow::Hidden,
                    };
                }
            }
        }
    }

    /// Snap to an instantaneous open/closed state.
    fn snap(&mut self, open: bool) {
        self.open = open;
        self.content = if open {
            ContentStyle::expanded()
        } else {
            ContentStyle::collapsed()
        };
        self.phase = Phase::Idle;
    }
}

/// Opacity runs on a shorter curve than height (0.2s against 0.3s).
fn opacity_duration(duration: Duration) -> Duration {
    duration * 2 / 3
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// Cubic ease-out.
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// All disclosure animators of a page.
#[derive(Debug, Clone)]
pub struct Animations {
    animators: HashMap<ElementId, DisclosureAnimator>,
    duration: Duration,
    enabled: bool,
}

/// Fit every eligible disclosure in the document with an animator.
pub fn wire_disclosures(page: &mut Page, config: &AnimationConfig) -> Animations {
    let animators: HashMap<_, _> = page
        .disclosures()
        .into_iter()
        .filter(|d| d.has_summary && d.has_content)
        .map(|d| {
            let animator =
                DisclosureAnimator::new(d.element, d.summary_link, d.content_len as u32, d.open);
            (d.element, animator)
        })
        .collect();

    tracing::debug!(disclosures = animators.len(), "wired disclosure animations");
    Animations {
        animators,
        duration: Duration::from_millis(config.duration_ms),
        enabled: config.enabled,
    }
}

impl Animations {
    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }

    pub fn get(&self, element: ElementId) -> Option<&DisclosureAnimator> {
        self.animators.get(&element)
    }

    pub fn is_animating(&self) -> bool {
        self.animators.values().any(DisclosureAnimator::is_animating)
    }

    /// Route a click on a disclosure summary.
    pub fn click(&mut self, element: ElementId, target: ClickTarget, now: Instant) -> ClickResult {
        let Some(animator) = self.animators.get_mut(&element) else {
            return ClickResult::Ignored;
        };

        match target {
            ClickTarget::SummaryLink => ClickResult::Navigate(animator.link.clone()),
            ClickTarget::Summary => {
                let opening = animator.toggle(now);
                if !self.enabled {
                    animator.snap(opening);
                }
                ClickResult::Toggled { opening }
            }
        }
    }

    /// Advance all running transitions and write their frames into `state`.
    pub fn tick(&mut self, now: Instant, state: &mut VisualState) {
        for animator in self.animators.values_mut() {
            if !animator.is_animating() {
                continue;
            }
            animator.tick(now, self.duration);
            state.set_disclosure(animator.element, animator.open, animator.content);
        }
    }

    /// Write the state of one animator into `state` immediately.
    pub fn flush(&self, element: ElementId, state: &mut VisualState) {
        if let Some(animator) = self.animators.get(&element) {
            state.set_disclosure(element, animator.open, animator.content);
        }
    }

    /// Adopt open/closed states written by the filter, cancelling transitions.
    ///
    /// The snapped style is written back, so disclosures the filter never
    /// touches do not keep a half-finished frame.
    pub fn sync(&mut self, state: &mut VisualState) {
        for animator in self.animators.values_mut() {
            let was_animating = animator.is_animating();
            animator.snap(state.is_open(animator.element));
            if was_animating {
                state.set_disclosure(animator.element, animator.open, animator.content);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;

    const PAGE: &str = r##"<html><body><main><nav><section>
<details class="category" open><summary><h2>Guides</h2></summary><ul>
  <li><details><summary><a href="setup.html">Setup</a></summary><ul>
    <li><a href="#a">a</a></li><li><a href="#b">b</a></li>
    <li><a href="#c">c</a></li><li><a href="#d">d</a></li>
  </ul></details></li>
</ul></details>
</section></nav></main>
<aside><details><summary>No content</summary></details></aside>
</body></html>"##;

    fn setup(config: AnimationConfig) -> (Page, Animations, ElementId) {
        let mut page = Page::parse(PAGE, &SelectorConfig::default()).unwrap();
        let animations = wire_disclosures(&mut page, &config);
        let section = page
            .disclosures()
            .into_iter()
            .find(|d| d.summary_link.is_some())
            .unwrap()
            .element;
        (page, animations, section)
    }

    #[test]
    fn test_wires_only_complete_disclosures() {
        let (_, animations, section) = setup(AnimationConfig::default());
        assert_eq!(animations.len(), 2);
        assert!(!animations.get(section).unwrap().is_open());
    }

    #[test]
    fn test_link_click_is_not_intercepted() {
        let (_, mut animations, section) = setup(AnimationConfig::default());
        let result = animations.click(section, ClickTarget::SummaryLink, Instant::now());

        assert_eq!(result, ClickResult::Navigate(Some("setup.html".to_string())));
        assert!(!animations.is_animating());
    }

    #[test]
    fn test_expand_transition() {
        let (page, mut animations, section) = setup(AnimationConfig::default());
        let mut state = VisualState::from_page(&page);
        let start = Instant::now();

        let result = animations.click(section, ClickTarget::Summary, start);
        assert_eq!(result, ClickResult::Toggled { opening: true });
        // Opens immediately, content starts clamped
        animations.flush(section, &mut state);
        assert!(state.is_open(section));
        let content = state.style(section).unwrap().content.unwrap();
        assert_eq!(content.max_height, MaxHeight::Px(0));

        animations.tick(start + Duration::from_millis(150), &mut state);
        let content = state.style(section).unwrap().content.unwrap();
        assert!(matches!(content.max_height, MaxHeight::Px(px) if px > 0 && px <= 4));
        assert_eq!(content.overflow, Overflow::Hidden);

        animations.tick(start + Duration::from_millis(300), &mut state);
        let content = state.style(section).unwrap().content.unwrap();
        assert_eq!(content.max_height, MaxHeight::Px(4));
        assert_eq!(content.opacity, 1.0);
        assert_eq!(content.overflow, Overflow::Visible);
        assert!(!animations.is_animating());
    }

    #[test]
    fn test_collapse_closes_after_duration() {
        let (page, mut animations, section) = setup(AnimationConfig::default());
        let mut state = VisualState::from_page(&page);
        let start = Instant::now();

        animations.click(section, ClickTarget::Summary, start);
        animations.tick(start + Duration::from_millis(300), &mut state);

        let later = start + Duration::from_secs(1);
        let result = animations.click(section, ClickTarget::Summary, later);
        assert_eq!(result, ClickResult::Toggled { opening: false });

        animations.tick(later + Duration::from_millis(100), &mut state);
        assert!(state.is_open(section), "stays open while collapsing");

        animations.tick(later + Duration::from_millis(300), &mut state);
        assert!(!state.is_open(section));
        assert_eq!(
            state.style(section).unwrap().content,
            Some(ContentStyle::collapsed())
        );
    }

    #[test]
    fn test_disabled_animation_snaps() {
        let config = AnimationConfig {
            enabled: false,
            ..AnimationConfig::default()
        };
        let (page, mut animations, section) = setup(config);
        let mut state = VisualState::from_page(&page);

        animations.click(section, ClickTarget::Summary, Instant::now());
        animations.flush(section, &mut state);

        assert!(!animations.is_animating());
        assert!(state.is_open(section));
        assert_eq!(
            state.style(section).unwrap().content,
            Some(ContentStyle::expanded())
        );
    }

    #[test]
    fn test_sync_cancels_transitions() {
        let (page, mut animations, section) = setup(AnimationConfig::default());
        let mut state = VisualState::from_page(&page);

        animations.click(section, ClickTarget::Summary, Instant::now());
        state.collapse(section);
        animations.sync(&mut state);

        assert!(!animations.is_animating());
        assert!(!animations.get(section).unwrap().is_open());
        assert_eq!(
            state.style(section).unwrap().content,
            Some(ContentStyle::collapsed())
        );
    }

    #[test]
    fn test_click_mid_expand_collapses() {
        let (page, mut animations, section) = setup(AnimationConfig::default());
        let mut state = VisualState::from_page(&page);
        let start = Instant::now();

        let first = animations.click(section, ClickTarget::Summary, start);
        assert_eq!(first, ClickResult::Toggled { opening: true });
        animations.tick(start + Duration::from_millis(100), &mut state);

        let second = animations.click(
            section,
            ClickTarget::Summary,
            start + Duration::from_millis(150),
        );
        assert_eq!(second, ClickResult::Toggled { opening: false });

        animations.tick(start + Duration::from_secs(1), &mut state);
        assert!(!animations.get(section).unwrap().is_open());
        assert!(!state.is_open(section));
        assert_eq!(
            state.style(section).unwrap().content,
            Some(ContentStyle::collapsed())
        );
    }

    #[test]
    fn test_sync_clears_partial_frame_of_untouched_disclosure() {
        let (page, mut animations, section) = setup(AnimationConfig::default());
        let mut state = VisualState::from_page(&page);
        let start = Instant::now();

        // Fully open, then interrupt a collapse halfway
        animations.click(section, ClickTarget::Summary, start);
        animations.tick(start + Duration::from_millis(300), &mut state);
        let later = start + Duration::from_secs(1);
        animations.click(section, ClickTarget::Summary, later);
        animations.tick(later + Duration::from_millis(100), &mut state);
        let content = state.style(section).unwrap().content.unwrap();
        assert!(matches!(content.max_height, MaxHeight::Px(px) if px < 4));

        // The filter left this element alone: still open, so it snaps back expanded
        animations.sync(&mut state);
        assert!(!animations.is_animating());
        assert!(state.is_open(section));
        assert_eq!(
            state.style(section).unwrap().content,
            Some(ContentStyle::expanded())
        );
    }

    #[test]
    fn test_ease_out_bounds() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
    }
}
