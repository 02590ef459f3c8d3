//! Registry of the clinic's doctors and imaging rooms

use rand::seq::SliceRandom;
use rand::RngCore;

use super::resource::{PriorityKey, PriorityResource, RequestOutcome};
use crate::simulation::{ProcessId, SimulationError, SimulationResult};
use crate::types::{DoctorId, ImagingRoomId, ResourceId};

/// Owns every contended resource of the clinic
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    doctors: Vec<PriorityResource>,
    imaging_rooms: Vec<PriorityResource>,
}

impl ResourceRegistry {
    /// One capacity-one server per doctor and per imaging room
    pub fn new(doctor_count: usize, imaging_room_count: usize) -> Self {
        Self {
            doctors: (0..doctor_count)
                .map(|i| PriorityResource::new(ResourceId::Doctor(DoctorId(i)), 1))
                .collect(),
            imaging_rooms: (0..imaging_room_count)
                .map(|i| PriorityResource::new(ResourceId::Imaging(ImagingRoomId(i)), 1))
                .collect(),
        }
    }

    /// Number of doctors
    pub fn doctor_count(&self) -> usize {
        self.doctors.len()
    }

    /// Number of imaging rooms
    pub fn imaging_room_count(&self) -> usize {
        self.imaging_rooms.len()
    }

    /// Look up a resource
    pub fn get(&self, id: ResourceId) -> SimulationResult<&PriorityResource> {
        let found = match id {
            ResourceId::Doctor(doctor) => self.doctors.get(doctor.index()),
            ResourceId::Imaging(room) => self.imaging_rooms.get(room.index()),
        };
        found.ok_or_else(|| SimulationError::resource_error(format!("unknown resource {}", id)))
    }

    fn get_mut(&mut self, id: ResourceId) -> SimulationResult<&mut PriorityResource> {
        let found = match id {
            ResourceId::Doctor(doctor) => self.doctors.get_mut(doctor.index()),
            ResourceId::Imaging(room) => self.imaging_rooms.get_mut(room.index()),
        };
        found.ok_or_else(|| SimulationError::resource_error(format!("unknown resource {}", id)))
    }

    /// Request a slot on `id` for `process`
    pub fn request(
        &mut self,
        id: ResourceId,
        process: ProcessId,
        key: PriorityKey,
    ) -> SimulationResult<RequestOutcome> {
        self.get_mut(id)?.request(process, key)
    }

    /// Release the slot `process` holds on `id`
    pub fn release(&mut self, id: ResourceId, process: ProcessId) -> SimulationResult<Option<ProcessId>> {
        self.get_mut(id)?.release(process)
    }

    /// Remove `process` from every resource, returning newly granted processes
    pub fn evict(&mut self, process: ProcessId) -> Vec<ProcessId> {
        self.doctors
            .iter_mut()
            .chain(self.imaging_rooms.iter_mut())
            .flat_map(|resource| resource.evict(process))
            .collect()
    }

    /// Waiting-queue length of every doctor, by doctor id
    pub fn doctor_queue_lengths(&self) -> Vec<usize> {
        self.doctors.iter().map(PriorityResource::queue_len).collect()
    }

    /// Waiting-queue length of every imaging room, by room id
    pub fn imaging_queue_lengths(&self) -> Vec<usize> {
        self.imaging_rooms.iter().map(PriorityResource::queue_len).collect()
    }

    /// Holder count of every doctor
    pub fn doctor_holder_counts(&self) -> Vec<usize> {
        self.doctors.iter().map(PriorityResource::holder_count).collect()
    }

    /// Holder count of every imaging room
    pub fn imaging_holder_counts(&self) -> Vec<usize> {
        self.imaging_rooms.iter().map(PriorityResource::holder_count).collect()
    }

    /// Rooms whose waiting queue is currently the shortest
    pub fn shortest_imaging_queues(&self) -> Vec<ImagingRoomId> {
        let Some(min) = self.imaging_rooms.iter().map(PriorityResource::queue_len).min() else {
            return Vec::new();
        };
        self.imaging_rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.queue_len() == min)
            .map(|(index, _)| ImagingRoomId(index))
            .collect()
    }

    /// Pick uniformly among the rooms with the shortest queue
    pub fn choose_imaging_room(&self, rng: &mut dyn RngCore) -> SimulationResult<ImagingRoomId> {
        self.shortest_imaging_queues()
            .choose(rng)
            .copied()
            .ok_or_else(|| SimulationError::resource_error("no imaging rooms configured"))
    }

    /// No resource has a holder or a waiting request
    pub fn all_idle(&self) -> bool {
        self.doctors.iter().chain(self.imaging_rooms.iter()).all(PriorityResource::is_idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn imaging(index: usize) -> ResourceId {
        ResourceId::Imaging(ImagingRoomId(index))
    }

    #[test]
    fn test_registry_layout() {
        let registry = ResourceRegistry::new(7, 2);
        assert_eq!(registry.doctor_count(), 7);
        assert_eq!(registry.imaging_room_count(), 2);
        assert!(registry.all_idle());
        assert!(registry.get(ResourceId::Doctor(DoctorId(7))).is_err());
    }

    #[test]
    fn test_shortest_queue_candidates() {
        let mut registry = ResourceRegistry::new(1, 3);
        // Room 1 gets a holder and one waiter; rooms 0 and 2 stay empty-queued
        registry.request(imaging(1), ProcessId(0), PriorityKey::walk_in(0.0)).unwrap();
        registry.request(imaging(1), ProcessId(1), PriorityKey::walk_in(1.0)).unwrap();
        registry.request(imaging(0), ProcessId(2), PriorityKey::walk_in(2.0)).unwrap();

        assert_eq!(registry.shortest_imaging_queues(), vec![ImagingRoomId(0), ImagingRoomId(2)]);

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let room = registry.choose_imaging_room(&mut rng).unwrap();
            assert_ne!(room, ImagingRoomId(1));
        }
    }

    #[test]
    fn test_choice_covers_all_tied_rooms() {
        let registry = ResourceRegistry::new(1, 2);
        let mut rng = StdRng::seed_from_u64(11);
        let picks: Vec<_> = (0..100).map(|_| registry.choose_imaging_room(&mut rng).unwrap()).collect();

        assert!(picks.contains(&ImagingRoomId(0)));
        assert!(picks.contains(&ImagingRoomId(1)));
    }

    #[test]
    fn test_all_idle_tracks_holders() {
        let mut registry = ResourceRegistry::new(2, 1);
        let doctor = ResourceId::Doctor(DoctorId(1));

        registry.request(doctor, ProcessId(4), PriorityKey::appointment(10.0)).unwrap();
        assert!(!registry.all_idle());
        assert_eq!(registry.doctor_holder_counts(), vec![0, 1]);

        registry.release(doctor, ProcessId(4)).unwrap();
        assert!(registry.all_idle());
    }

    #[test]
    fn test_no_rooms_is_an_error() {
        let registry = ResourceRegistry::new(1, 0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(registry.choose_imaging_room(&mut rng).is_err());
    }
}
