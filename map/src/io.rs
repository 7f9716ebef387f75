//! Binary world persistence (`LWBB` format).
//!
//! Load is implemented in full, symmetric with save, against the exact
//! table layout the save path writes.

use std::collections::HashMap;
use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use log::warn;
use nalgebra_glm as glm;

use crate::sector::{Sector, SubSector};
use crate::wall::{Wall, WallRef};
use crate::world::{PortalWorld, SectorId};
use crate::Error;

const MAGIC: &[u8; 4] = b"LWBB";
const MIN_SUPPORTED_VERSION: u32 = 1;
const MAX_SUPPORTED_VERSION: u32 = 1;
const SAVE_VERSION: u32 = 1;
const NONE: u32 = 0xFFFF_FFFF;

const HEADER_SIZE: u32 = 24;
const SECTOR_ENTRY_SIZE: u32 = 16;
const SUBSECTOR_ENTRY_SIZE: u32 = 8;

pub fn save<W: Write>(world: &PortalWorld, writer: &mut W) -> Result<(), Error> {
    let mut index_of: HashMap<SectorId, u32> = HashMap::new();
    for (out_index, (id, _)) in world.iter().enumerate() {
        index_of.insert(id, out_index as u32);
    }

    let num_sectors = index_of.len() as u32;

    let mut num_subsectors_total = 0u32;
    let mut num_walls_total = 0u32;
    for (_, sector) in world.iter() {
        num_subsectors_total += sector.subsectors.len() as u32;
        num_walls_total += sector.walls.len() as u32;
    }

    let subsector_table_start = HEADER_SIZE + num_sectors * SECTOR_ENTRY_SIZE;
    let wall_table_start = subsector_table_start + num_subsectors_total * SUBSECTOR_ENTRY_SIZE;

    writer.write_all(MAGIC)?;
    writer.write_u32::<LE>(SAVE_VERSION)?;
    writer.write_u32::<LE>(num_sectors)?;
    writer.write_u32::<LE>(HEADER_SIZE)?;
    writer.write_u32::<LE>(subsector_table_start)?;
    writer.write_u32::<LE>(wall_table_start)?;

    let mut subsector_offset = 0u32;
    let mut wall_offset = 0u32;
    for (_, sector) in world.iter() {
        writer.write_u32::<LE>(sector.subsectors.len() as u32)?;
        writer.write_u32::<LE>(sector.walls.len() as u32)?;
        writer.write_u32::<LE>(subsector_offset)?;
        writer.write_u32::<LE>(wall_offset)?;
        subsector_offset += sector.subsectors.len() as u32;
        wall_offset += sector.walls.len() as u32;
    }

    for (_, sector) in world.iter() {
        for sub in &sector.subsectors {
            writer.write_f32::<LE>(sub.floor_height)?;
            writer.write_f32::<LE>(sub.ceiling_height)?;
        }
    }

    for (_, sector) in world.iter() {
        for wall in &sector.walls {
            writer.write_f32::<LE>(wall.start.x)?;
            writer.write_f32::<LE>(wall.start.y)?;
            writer.write_u32::<LE>(wall.next)?;
            match wall.portal {
                Some(WallRef { sector, wall }) => {
                    let sector_index = *index_of.get(&sector).unwrap_or(&u32::MAX);
                    if sector_index == u32::MAX {
                        warn!("dropping portal reference to a tombstoned sector on save");
                        writer.write_u32::<LE>(NONE)?;
                        writer.write_u32::<LE>(NONE)?;
                    } else {
                        writer.write_u32::<LE>(sector_index)?;
                        writer.write_u32::<LE>(wall)?;
                    }
                }
                None => {
                    writer.write_u32::<LE>(NONE)?;
                    writer.write_u32::<LE>(NONE)?;
                }
            }
        }
    }

    Ok(())
}

struct RawWall {
    x: f32,
    y: f32,
    next: u32,
    portal_sector: u32,
    portal_wall: u32,
}

pub fn load<R: Read>(reader: &mut R) -> Result<PortalWorld, Error> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::InvalidMagic);
    }

    let version = reader.read_u32::<LE>()?;
    if !(MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    let num_sectors = reader.read_u32::<LE>()?;
    let _sector_table_start = reader.read_u32::<LE>()?;
    let _subsector_table_start = reader.read_u32::<LE>()?;
    let _wall_table_start = reader.read_u32::<LE>()?;

    struct RawSector {
        num_subsectors: u32,
        num_walls: u32,
        first_subsector_offset: u32,
        first_wall_offset: u32,
    }

    let mut raw_sectors = Vec::with_capacity(num_sectors as usize);
    for _ in 0..num_sectors {
        raw_sectors.push(RawSector {
            num_subsectors: reader.read_u32::<LE>()?,
            num_walls: reader.read_u32::<LE>()?,
            first_subsector_offset: reader.read_u32::<LE>()?,
            first_wall_offset: reader.read_u32::<LE>()?,
        });
    }

    let num_subsectors_total: u32 = raw_sectors.iter().map(|s| s.num_subsectors).sum();
    let mut subsectors = Vec::with_capacity(num_subsectors_total as usize);
    for _ in 0..num_subsectors_total {
        subsectors.push(SubSector {
            floor_height: reader.read_f32::<LE>()?,
            ceiling_height: reader.read_f32::<LE>()?,
        });
    }

    let num_walls_total: u32 = raw_sectors.iter().map(|s| s.num_walls).sum();
    let mut raw_walls = Vec::with_capacity(num_walls_total as usize);
    for _ in 0..num_walls_total {
        raw_walls.push(RawWall {
            x: reader.read_f32::<LE>()?,
            y: reader.read_f32::<LE>()?,
            next: reader.read_u32::<LE>()?,
            portal_sector: reader.read_u32::<LE>()?,
            portal_wall: reader.read_u32::<LE>()?,
        });
    }

    let mut world = PortalWorld::new();
    let mut ids = Vec::with_capacity(raw_sectors.len());

    for raw in &raw_sectors {
        let sub_slice = &subsectors[raw.first_subsector_offset as usize
            ..(raw.first_subsector_offset + raw.num_subsectors) as usize];
        let wall_slice = &raw_walls
            [raw.first_wall_offset as usize..(raw.first_wall_offset + raw.num_walls) as usize];

        let mut walls: Vec<Wall> = wall_slice
            .iter()
            .enumerate()
            .map(|(i, rw)| {
                let mut w = Wall::new(glm::vec2(rw.x, rw.y));
                w.next = rw.next;
                w.prev = i as u32; // placeholder, fixed below
                w
            })
            .collect();

        // reconstruct prev from next
        let mut prev_of = vec![0u32; walls.len()];
        for (i, w) in walls.iter().enumerate() {
            prev_of[w.next as usize] = i as u32;
        }
        for (i, w) in walls.iter_mut().enumerate() {
            w.prev = prev_of[i];
        }

        // plane recompute
        let starts: Vec<glm::Vec2> = walls.iter().map(|w| w.start).collect();
        for w in &mut walls {
            w.plane = crate::wall::plane_from_endpoints(w.start, starts[w.next as usize]);
        }

        let sector = Sector {
            walls,
            subsectors: sub_slice.to_vec(),
        };
        ids.push(world.insert(sector));
    }

    // second pass: resolve portal references now that every SectorId is known
    for (sector_out_index, raw) in raw_sectors.iter().enumerate() {
        let id = ids[sector_out_index];
        let wall_slice = &raw_walls
            [raw.first_wall_offset as usize..(raw.first_wall_offset + raw.num_walls) as usize];
        for (local_index, rw) in wall_slice.iter().enumerate() {
            if rw.portal_sector == NONE || rw.portal_wall == NONE {
                continue;
            }
            let portal = WallRef::new(ids[rw.portal_sector as usize], rw.portal_wall);
            if let Some(sector) = world.get_mut(id) {
                sector.walls[local_index].portal = Some(portal);
            }
        }
    }

    Ok(world)
}
