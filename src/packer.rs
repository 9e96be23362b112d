use log::{debug, warn};

use crate::error::AtlasError;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grows the rect by `amount` on every side. The origin moves up and left,
    /// so callers must only inflate rects that were placed with room for it.
    pub fn inflate(&self, amount: u32) -> Rect {
        Rect {
            x: self.x - amount,
            y: self.y - amount,
            w: self.w + 2 * amount,
            h: self.h + 2 * amount,
        }
    }
}

/// Where one requested rectangle ended up. `x`/`y` are the top-left of the
/// un-padded rectangle.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Placement {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub packed: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

// one horizontal run of the skyline: everything below `y` is taken between x and x + width
#[derive(Clone, Copy, Debug)]
struct Segment {
    x: u32,
    y: u32,
    width: u32,
}

/// Bottom-left skyline packer over a fixed canvas.
#[derive(Debug)]
pub struct Skyline {
    width: u32,
    height: u32,
    segments: Vec<Segment>,
}

impl Skyline {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            segments: vec![Segment {
                x: 0,
                y: 0,
                width,
            }],
        }
    }

    /// Reserves a `w`x`h` area at the lowest (then leftmost) free spot.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let (index, y) = self.find(w, h)?;
        let x = self.segments[index].x;
        let right = x + w;

        // drop or shorten every segment the new rect covers
        let mut j = index;
        while j < self.segments.len() && self.segments[j].x < right {
            let seg_right = self.segments[j].x + self.segments[j].width;
            if seg_right <= right {
                self.segments.remove(j);
            } else {
                self.segments[j].width = seg_right - right;
                self.segments[j].x = right;
                break;
            }
        }
        self.segments.insert(
            index,
            Segment {
                x,
                y: y + h,
                width: w,
            },
        );
        self.merge();

        Some((x, y))
    }

    fn find(&self, w: u32, h: u32) -> Option<(usize, u32)> {
        if w > self.width || h > self.height {
            return None;
        }
        let mut best: Option<(usize, u32)> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.x + w > self.width {
                break;
            }
            let Some(y) = self.resting_height(i, w) else {
                continue;
            };
            if y + h > self.height {
                continue;
            }
            // strict comparison keeps the leftmost of equally low spots
            if best.map_or(true, |(_, best_y)| y < best_y) {
                best = Some((i, y));
            }
        }
        best
    }

    // highest skyline point under [segments[index].x, segments[index].x + w)
    fn resting_height(&self, index: usize, w: u32) -> Option<u32> {
        let right = self.segments[index].x + w;
        let mut y = 0;
        for segment in &self.segments[index..] {
            if segment.x >= right {
                return Some(y);
            }
            y = y.max(segment.y);
        }
        // segments always span the full width, so running out means we reached the edge
        (right <= self.width).then_some(y)
    }

    fn merge(&mut self) {
        let mut i = 0;
        while i + 1 < self.segments.len() {
            if self.segments[i].y == self.segments[i + 1].y {
                self.segments[i].width += self.segments[i + 1].width;
                self.segments.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}

// a side plus padding on both ends, or None when it can't be represented
fn inflated(side: u32, padding: u32) -> Option<u32> {
    padding.checked_mul(2)?.checked_add(side)
}

/// Places every `(w, h)` request in input order, inflated by `padding` on all
/// sides. Requests that don't fit come back with `packed == false`; the rest
/// of the list is still attempted.
pub fn place_all(sizes: &[(u32, u32)], width: u32, height: u32, padding: u32) -> Vec<Placement> {
    let mut skyline = Skyline::new(width, height);
    sizes
        .iter()
        .enumerate()
        .map(|(id, &(w, h))| {
            let slot = inflated(w, padding)
                .zip(inflated(h, padding))
                .and_then(|(pw, ph)| skyline.insert(pw, ph));
            let (x, y) = slot.map_or((0, 0), |(x, y)| (x + padding, y + padding));
            Placement {
                id,
                x,
                y,
                w,
                h,
                packed: slot.is_some(),
            }
        })
        .collect()
}

/// Packs all requests or none of them.
///
/// Every rect is grown by `padding` pixels on each side before packing, and
/// the reported offsets point at the un-padded rect, so each placed sprite
/// keeps a `padding`-wide empty border inside the canvas.
pub fn pack(
    sizes: &[(u32, u32)],
    width: u32,
    height: u32,
    padding: u32,
) -> Result<Vec<Placement>, AtlasError> {
    if let Some(id) = sizes.iter().position(|&(w, h)| w == 0 || h == 0) {
        return Err(AtlasError::EmptySource { id });
    }

    let placements = place_all(sizes, width, height, padding);
    let unplaced = placements.iter().filter(|p| !p.packed).count();
    if let Some(first) = placements.iter().find(|p| !p.packed) {
        warn!(
            "{} of {} rects didn't fit into {}x{} (padding {})",
            unplaced,
            sizes.len(),
            width,
            height,
            padding
        );
        return Err(AtlasError::PackingOverflow {
            id: first.id,
            canvas_width: width,
            canvas_height: height,
        });
    }

    debug!(
        "packed {} rects into {}x{} (padding {})",
        placements.len(),
        width,
        height,
        padding
    );
    Ok(placements)
}
