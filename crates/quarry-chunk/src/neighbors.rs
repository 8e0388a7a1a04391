use crate::face::Face;

/// Which of the six adjacent chunks are currently linked (loaded and known to this one).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborLinks {
    pub pos_y: bool,
    pub neg_y: bool,
    pub pos_x: bool,
    pub neg_x: bool,
    pub pos_z: bool,
    pub neg_z: bool,
}

impl NeighborLinks {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            pos_y: false,
            neg_y: false,
            pos_x: false,
            neg_x: false,
            pos_z: false,
            neg_z: false,
        }
    }

    #[inline]
    pub fn get(&self, face: Face) -> bool {
        match face {
            Face::PosY => self.pos_y,
            Face::NegY => self.neg_y,
            Face::PosX => self.pos_x,
            Face::NegX => self.neg_x,
            Face::PosZ => self.pos_z,
            Face::NegZ => self.neg_z,
        }
    }

    #[inline]
    pub fn set(&mut self, face: Face, linked: bool) {
        let slot = match face {
            Face::PosY => &mut self.pos_y,
            Face::NegY => &mut self.neg_y,
            Face::PosX => &mut self.pos_x,
            Face::NegX => &mut self.neg_x,
            Face::PosZ => &mut self.pos_z,
            Face::NegZ => &mut self.neg_z,
        };
        *slot = linked;
    }

    pub fn count(&self) -> usize {
        Face::ALL.iter().filter(|f| self.get(**f)).count()
    }

    pub fn linked_faces(&self) -> impl Iterator<Item = Face> + '_ {
        Face::ALL.into_iter().filter(|f| self.get(*f))
    }
}
