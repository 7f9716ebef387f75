use map::{wall::WallRef, PortalWorld, Sector, SubSector, Wall};
use nalgebra_glm as glm;

fn quad(offset: f32, walls_ccw: bool) -> Sector {
    let points = if walls_ccw {
        [
            glm::vec2(offset, 0.0),
            glm::vec2(offset + 10.0, 0.0),
            glm::vec2(offset + 10.0, 10.0),
            glm::vec2(offset, 10.0),
        ]
    } else {
        [
            glm::vec2(offset, 0.0),
            glm::vec2(offset, 10.0),
            glm::vec2(offset + 10.0, 10.0),
            glm::vec2(offset + 10.0, 0.0),
        ]
    };

    let mut sector = Sector {
        walls: points.iter().map(|&p| Wall::new(p)).collect(),
        subsectors: vec![SubSector::DEFAULT],
    };
    for i in 0..4 {
        sector.walls[i].next = ((i + 1) % 4) as u32;
        sector.walls[i].prev = ((i + 3) % 4) as u32;
    }
    sector
}

#[test]
fn multi_sector_world_round_trips_through_a_file() {
    let dir = std::env::temp_dir();
    let path = dir.join("lightware_persistence_test.lwbb");

    let mut world = PortalWorld::new();
    let a = world.insert(quad(0.0, true));
    let b = world.insert(quad(10.0, true));
    world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

    world.save_to_path(&path).unwrap();
    let loaded = PortalWorld::load_from_path(&path).unwrap();

    assert_eq!(loaded.len(), 2);
    for (id, sector) in loaded.iter() {
        assert_eq!(sector.num_walls(), 4);
        assert!(sector.signed_area_sum() <= 0.0);
        for (wall_index, wall) in sector.walls.iter().enumerate() {
            if wall.portal.is_some() {
                assert!(loaded.portal_still_coincident(WallRef::new(id, wall_index as u32)));
            }
        }
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn unsupported_version_is_rejected() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"LWBB");
    bytes.extend_from_slice(&99u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&24u32.to_le_bytes());
    bytes.extend_from_slice(&24u32.to_le_bytes());
    bytes.extend_from_slice(&24u32.to_le_bytes());

    let err = map::io::load(&mut std::io::Cursor::new(&bytes)).unwrap_err();
    assert!(matches!(err, map::Error::UnsupportedVersion(99)));
}
