use serde::Serialize;

/// The kind of structure a growth step adds to the plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// New segment continuing the host's heading.
    Stem,
    /// New segment splaying off at a wide angle.
    Branch,
    Leaf,
    Flower,
}

impl Archetype {
    /// Picks a growth kind from a uniform `roll` in [0, 1). The bands depend
    /// on how many segments the plant already has:
    ///
    /// | segments | stem | branch | leaf | flower |
    /// |----------|------|--------|------|--------|
    /// | < 6      | 85%  | -      | 15%  | -      |
    /// | < 20     | 35%  | 30%    | 35%  | -      |
    /// | >= 20    | 15%  | 10%    | 65%  | 10%    |
    pub fn choose(segment_count: usize, roll: f32) -> Archetype {
        if segment_count < 6 {
            if roll < 0.85 {
                Archetype::Stem
            } else {
                Archetype::Leaf
            }
        } else if segment_count < 20 {
            if roll < 0.35 {
                Archetype::Stem
            } else if roll < 0.65 {
                Archetype::Branch
            } else {
                Archetype::Leaf
            }
        } else if roll < 0.15 {
            Archetype::Stem
        } else if roll < 0.25 {
            Archetype::Branch
        } else if roll < 0.9 {
            Archetype::Leaf
        } else {
            Archetype::Flower
        }
    }

    /// Whether this kind adds a stem segment.
    pub fn adds_segment(self) -> bool {
        matches!(self, Archetype::Stem | Archetype::Branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seedling_only_extends_or_leafs() {
        assert_eq!(Archetype::choose(1, 0.0), Archetype::Stem);
        assert_eq!(Archetype::choose(5, 0.849), Archetype::Stem);
        assert_eq!(Archetype::choose(5, 0.85), Archetype::Leaf);
        assert_eq!(Archetype::choose(5, 0.999), Archetype::Leaf);
    }

    #[test]
    fn young_plant_bands() {
        assert_eq!(Archetype::choose(6, 0.2), Archetype::Stem);
        assert_eq!(Archetype::choose(6, 0.35), Archetype::Branch);
        assert_eq!(Archetype::choose(19, 0.64), Archetype::Branch);
        assert_eq!(Archetype::choose(19, 0.65), Archetype::Leaf);
    }

    #[test]
    fn mature_plant_bands() {
        assert_eq!(Archetype::choose(20, 0.1), Archetype::Stem);
        assert_eq!(Archetype::choose(20, 0.2), Archetype::Branch);
        assert_eq!(Archetype::choose(100, 0.5), Archetype::Leaf);
        assert_eq!(Archetype::choose(100, 0.95), Archetype::Flower);
    }

    #[test]
    fn flowers_only_on_mature_plants() {
        for count in 0..20 {
            for i in 0..100 {
                assert_ne!(Archetype::choose(count, i as f32 / 100.0), Archetype::Flower);
            }
        }
    }
}
