#![deny(unused)]
use std::{fs::File, io::BufWriter, path::Path};
use thiserror::Error;

pub mod geometry;
pub mod io;
pub mod sector;
pub mod wall;
pub mod world;

pub use sector::{Sector, SubSector};
pub use wall::{Wall, WallRef};
pub use world::{PortalWorld, SectorId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a LWBB world file")]
    InvalidMagic,

    #[error("unsupported world file version: {0}")]
    UnsupportedVersion(u32),

    /// IO error.
    #[error("world file IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalWorld {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut file = std::io::BufReader::new(File::open(path)?);
        io::load(&mut file)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(path)?);
        io::save(self, &mut file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm as glm;

    fn square(offset: f32) -> Sector {
        let mut sector = Sector {
            walls: vec![
                Wall::new(glm::vec2(offset, 0.0)),
                Wall::new(glm::vec2(offset + 10.0, 0.0)),
                Wall::new(glm::vec2(offset + 10.0, 10.0)),
                Wall::new(glm::vec2(offset, 10.0)),
            ],
            subsectors: vec![SubSector::DEFAULT],
        };
        for i in 0..4 {
            sector.walls[i].next = ((i + 1) % 4) as u32;
            sector.walls[i].prev = ((i + 3) % 4) as u32;
        }
        sector
    }

    #[test]
    fn save_load_round_trip_is_byte_identical() {
        let mut world = PortalWorld::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));
        world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

        let mut bytes = Vec::new();
        io::save(&world, &mut bytes).unwrap();

        let loaded = io::load(&mut std::io::Cursor::new(&bytes)).unwrap();
        let mut round_tripped = Vec::new();
        io::save(&loaded, &mut round_tripped).unwrap();

        assert_eq!(bytes, round_tripped);
    }

    #[test]
    fn load_rejects_bad_magic() {
        let bytes = vec![0u8; 24];
        assert!(matches!(
            io::load(&mut std::io::Cursor::new(&bytes)),
            Err(Error::InvalidMagic)
        ));
    }

    #[test]
    fn load_preserves_portal_symmetry() {
        let mut world = PortalWorld::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));
        world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

        let mut bytes = Vec::new();
        io::save(&world, &mut bytes).unwrap();
        let loaded = io::load(&mut std::io::Cursor::new(&bytes)).unwrap();

        let (id_a, sector_a) = loaded.iter().next().unwrap();
        let portal = sector_a.walls[1].portal.unwrap();
        let partner_sector = loaded.get(portal.sector).unwrap();
        let partner = partner_sector.walls[portal.wall as usize].portal.unwrap();
        assert_eq!(partner.sector, id_a);
        assert_eq!(partner.wall, 1);
    }
}
