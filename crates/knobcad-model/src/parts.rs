//! The static part-dependency graph driving update cascades.

/// One regenerable part of the knob.
///
/// `Surface` is a grouping node: it never regenerates anything itself
/// but fans out to the three surface feature families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// The revolved outer body.
    Body,
    /// Pointer wedges.
    Pointers,
    /// The screw-hole cavity.
    Cavity,
    /// Grouping node for the outer decorations.
    Surface,
    /// Knurling patches on the body.
    Knurling,
    /// Splines/ribs on the body.
    Splines,
    /// External threads on the body.
    Threads,
    /// Splines/keys on the cavity wall.
    InternalSplines,
    /// Threads on the cavity wall.
    InternalThreads,
}

impl Part {
    const ALL: [Part; 9] = [
        Part::Body,
        Part::Pointers,
        Part::Cavity,
        Part::Surface,
        Part::Knurling,
        Part::Splines,
        Part::Threads,
        Part::InternalSplines,
        Part::InternalThreads,
    ];

    fn bit(self) -> u16 {
        1 << Part::ALL.iter().position(|&p| p == self).unwrap_or(0)
    }

    /// Parts invalidated when this one regenerates.
    fn dependents(self) -> &'static [Part] {
        match self {
            Part::Body => &[Part::Surface, Part::Cavity],
            Part::Cavity => &[Part::InternalSplines, Part::InternalThreads],
            Part::Surface => &[Part::Knurling, Part::Splines, Part::Threads],
            _ => &[],
        }
    }
}

/// A small set of parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartSet(u16);

impl PartSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every part, the "regenerate everything" request.
    pub fn all() -> Self {
        let mut set = Self::new();
        for part in Part::ALL {
            set.insert(part);
        }
        set
    }

    /// Add one part.
    pub fn insert(&mut self, part: Part) {
        self.0 |= part.bit();
    }

    /// Membership test.
    pub fn contains(&self, part: Part) -> bool {
        self.0 & part.bit() != 0
    }

    /// Expand to the full invalidation cascade: a body change schedules
    /// the surface families and the cavity, a cavity change the internal
    /// families, and so on to a fixed point.
    pub fn closure(mut self) -> Self {
        loop {
            let before = self.0;
            for part in Part::ALL {
                if self.contains(part) {
                    for &dep in part.dependents() {
                        self.insert(dep);
                    }
                }
            }
            if self.0 == before {
                return self;
            }
        }
    }
}

impl FromIterator<Part> for PartSet {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        let mut set = Self::new();
        for part in iter {
            set.insert(part);
        }
        set
    }
}
