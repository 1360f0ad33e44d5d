use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use plansow_db::models::{
    CareAction, EventFilter, EventKind, MaintenanceAssignment, MaintenanceTemplate,
    NewAssignment, NewCareAction, NewEvent, NewPlant, NewPlantCare, NewPlanting, NewSeason,
    NewTreatment, Plant, PlantCare, Planting, PlantingMember, PlantingUpdate, ScheduledEvent,
    Season, Treatment,
};

use super::ScheduleStore;

#[derive(Default)]
struct Inner {
    plants: HashMap<Uuid, Plant>,
    treatments: HashMap<Uuid, Treatment>,
    care_actions: HashMap<Uuid, CareAction>,
    plant_cares: Vec<PlantCare>,
    plantings: HashMap<Uuid, Planting>,
    members: Vec<PlantingMember>,
    assignments: Vec<MaintenanceAssignment>,
    /// Insertion order stands in for `created_at` when dates tie.
    events: Vec<ScheduledEvent>,
    seasons: HashMap<Uuid, Season>,
}

impl Inner {
    fn is_scheduled(&self, planting_id: Uuid, kind: EventKind, date: NaiveDate) -> bool {
        self.events
            .iter()
            .any(|e| e.planting_id == planting_id && e.kind == kind && e.scheduled_date == date)
    }

    fn push_event(
        &mut self,
        planting_id: Uuid,
        assignment_id: Option<Uuid>,
        kind: EventKind,
        scheduled_date: NaiveDate,
        notes: Option<String>,
    ) -> Option<ScheduledEvent> {
        if self.is_scheduled(planting_id, kind, scheduled_date) {
            return None;
        }
        let event = ScheduledEvent {
            id: Uuid::new_v4(),
            planting_id,
            assignment_id,
            kind,
            scheduled_date,
            completed: false,
            completed_date: None,
            notes,
            created_at: Utc::now(),
        };
        self.events.push(event.clone());
        Some(event)
    }

    fn check_kind(&self, kind: EventKind) -> Result<()> {
        let known = match kind {
            EventKind::Treatment(id) => self.treatments.contains_key(&id),
            EventKind::CareAction(id) => self.care_actions.contains_key(&id),
        };
        if !known {
            bail!("unknown {kind}");
        }
        Ok(())
    }
}

/// A [`ScheduleStore`] held entirely in memory.
///
/// Enforces the same rules as the database schema: plantings need at least
/// one species, end dates may not precede start dates, season names are
/// unique and events are unique per planting, template and date.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_plant(&self, new: NewPlant) -> Plant {
        let plant = Plant {
            id: Uuid::new_v4(),
            name: new.name,
            scientific_name: new.scientific_name,
            icon: new.icon,
            growth_days: new.growth_days,
            harvest_period_days: new.harvest_period_days,
            notes: new.notes,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .await
            .plants
            .insert(plant.id, plant.clone());
        plant
    }

    pub async fn add_treatment(&self, new: NewTreatment) -> Treatment {
        let treatment = Treatment {
            id: Uuid::new_v4(),
            pest_id: new.pest_id,
            name: new.name,
            description: new.description,
            application_method: new.application_method,
            default_frequency_days: new.default_frequency_days,
            is_ecological: new.is_ecological,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .await
            .treatments
            .insert(treatment.id, treatment.clone());
        treatment
    }

    pub async fn add_care_action(&self, new: NewCareAction) -> CareAction {
        let action = CareAction {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            action_type: new.action_type,
            default_frequency_days: new.default_frequency_days,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .await
            .care_actions
            .insert(action.id, action.clone());
        action
    }

    pub async fn add_plant_care(&self, new: NewPlantCare) -> PlantCare {
        let link = PlantCare {
            id: Uuid::new_v4(),
            plant_id: new.plant_id,
            care_action_id: new.care_action_id,
            days_after_planting: new.days_after_planting,
            frequency_days: new.frequency_days,
            notes: new.notes,
        };
        self.inner.lock().await.plant_cares.push(link.clone());
        link
    }

    /// Number of stored assignments, for assertions.
    pub async fn assignment_count(&self) -> usize {
        self.inner.lock().await.assignments.len()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn get_planting(&self, id: Uuid) -> Result<Option<Planting>> {
        Ok(self.inner.lock().await.plantings.get(&id).cloned())
    }

    async fn planting_species(&self, planting_id: Uuid) -> Result<Vec<Plant>> {
        let inner = self.inner.lock().await;
        let mut species: Vec<Plant> = inner
            .members
            .iter()
            .filter(|m| m.planting_id == planting_id)
            .filter_map(|m| inner.plants.get(&m.plant_id).cloned())
            .collect();
        species.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(species)
    }

    async fn list_plantings_for_bed(&self, bed_id: Uuid) -> Result<Vec<Planting>> {
        let inner = self.inner.lock().await;
        let mut plantings: Vec<Planting> = inner
            .plantings
            .values()
            .filter(|p| p.bed_id == bed_id)
            .cloned()
            .collect();
        plantings.sort_by_key(|p| p.start_date);
        Ok(plantings)
    }

    async fn insert_planting(&self, new: &NewPlanting) -> Result<Planting> {
        if new.members.is_empty() {
            bail!("a planting needs at least one species");
        }
        if new.end_date.is_some_and(|end| end < new.start_date) {
            bail!("planting ends before it starts");
        }

        let mut inner = self.inner.lock().await;
        for member in &new.members {
            if !inner.plants.contains_key(&member.plant_id) {
                bail!("unknown plant {}", member.plant_id);
            }
        }

        let planting = Planting {
            id: Uuid::new_v4(),
            bed_id: new.bed_id,
            start_date: new.start_date,
            end_date: new.end_date,
            start_type: new.start_type,
            notes: new.notes.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        for member in &new.members {
            inner.members.push(PlantingMember {
                planting_id: planting.id,
                plant_id: member.plant_id,
                quantity_planted: member.quantity_planted,
                quantity_grown: member.quantity_grown,
            });
        }
        inner.plantings.insert(planting.id, planting.clone());
        Ok(planting)
    }

    async fn update_planting(
        &self,
        id: Uuid,
        update: &PlantingUpdate,
    ) -> Result<Option<Planting>> {
        let mut inner = self.inner.lock().await;
        let Some(planting) = inner.plantings.get_mut(&id) else {
            return Ok(None);
        };
        let mut updated = planting.clone();
        update.apply(&mut updated);
        if updated.end_date.is_some_and(|end| end < updated.start_date) {
            bail!("planting ends before it starts");
        }
        *planting = updated.clone();
        Ok(Some(updated))
    }

    async fn get_template(&self, kind: EventKind) -> Result<Option<MaintenanceTemplate>> {
        let inner = self.inner.lock().await;
        let template = match kind {
            EventKind::Treatment(id) => inner.treatments.get(&id).map(|t| MaintenanceTemplate {
                kind,
                name: t.name.clone(),
                default_frequency_days: t.default_frequency_days,
            }),
            EventKind::CareAction(id) => {
                inner.care_actions.get(&id).map(|c| MaintenanceTemplate {
                    kind,
                    name: c.name.clone(),
                    default_frequency_days: c.default_frequency_days,
                })
            }
        };
        Ok(template)
    }

    async fn insert_assignment(
        &self,
        new: &NewAssignment,
        dates: &[NaiveDate],
    ) -> Result<(MaintenanceAssignment, Vec<ScheduledEvent>)> {
        let mut inner = self.inner.lock().await;
        if !inner.plantings.contains_key(&new.planting_id) {
            bail!("unknown planting {}", new.planting_id);
        }
        inner.check_kind(new.template)?;

        let assignment = MaintenanceAssignment {
            id: Uuid::new_v4(),
            planting_id: new.planting_id,
            template: new.template,
            anchor_date: new.anchor_date,
            frequency_days: new.frequency_days,
            notes: new.notes.clone(),
            created_at: Utc::now(),
        };
        inner.assignments.push(assignment.clone());

        let created = dates
            .iter()
            .filter_map(|&date| {
                inner.push_event(
                    new.planting_id,
                    Some(assignment.id),
                    new.template,
                    date,
                    new.notes.clone(),
                )
            })
            .collect();

        Ok((assignment, created))
    }

    async fn insert_events(&self, events: &[NewEvent]) -> Result<Vec<ScheduledEvent>> {
        let mut inner = self.inner.lock().await;
        for event in events {
            if !inner.plantings.contains_key(&event.planting_id) {
                bail!("unknown planting {}", event.planting_id);
            }
            inner.check_kind(event.kind)?;
        }

        Ok(events
            .iter()
            .filter_map(|e| {
                inner.push_event(e.planting_id, None, e.kind, e.scheduled_date, e.notes.clone())
            })
            .collect())
    }

    async fn care_links_for_planting(&self, planting_id: Uuid) -> Result<Vec<PlantCare>> {
        let inner = self.inner.lock().await;
        let species: Vec<Uuid> = inner
            .members
            .iter()
            .filter(|m| m.planting_id == planting_id)
            .map(|m| m.plant_id)
            .collect();
        Ok(inner
            .plant_cares
            .iter()
            .filter(|link| species.contains(&link.plant_id))
            .cloned()
            .collect())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduledEvent>> {
        let inner = self.inner.lock().await;
        let mut events: Vec<ScheduledEvent> = inner
            .events
            .iter()
            .filter(|e| {
                let bed = inner.plantings.get(&e.planting_id).map(|p| p.bed_id);
                filter.matches(e, bed)
            })
            .cloned()
            .collect();
        // Stable: insertion order breaks date ties.
        events.sort_by_key(|e| e.scheduled_date);
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<ScheduledEvent>> {
        let inner = self.inner.lock().await;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn complete_event(&self, id: Uuid, date: NaiveDate) -> Result<Option<ScheduledEvent>> {
        let mut inner = self.inner.lock().await;
        let Some(event) = inner.events.iter_mut().find(|e| e.id == id && !e.completed) else {
            return Ok(None);
        };
        event.completed = true;
        event.completed_date = Some(date);
        Ok(Some(event.clone()))
    }

    async fn list_seasons(&self) -> Result<Vec<Season>> {
        let inner = self.inner.lock().await;
        let mut seasons: Vec<Season> = inner.seasons.values().cloned().collect();
        seasons.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(seasons)
    }

    async fn get_season(&self, id: Uuid) -> Result<Option<Season>> {
        Ok(self.inner.lock().await.seasons.get(&id).cloned())
    }

    async fn insert_season(&self, new: &NewSeason) -> Result<Season> {
        let mut inner = self.inner.lock().await;
        if inner.seasons.values().any(|s| s.name == new.name) {
            bail!("season {:?} already exists", new.name);
        }
        let season = Season {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            start_date: new.start_date,
            end_date: new.end_date,
            description: new.description.clone(),
            notes: new.notes.clone(),
            created_at: Utc::now(),
        };
        inner.seasons.insert(season.id, season.clone());
        Ok(season)
    }

    async fn set_season_end(&self, id: Uuid, end: Option<NaiveDate>) -> Result<Option<Season>> {
        let mut inner = self.inner.lock().await;
        let Some(season) = inner.seasons.get_mut(&id) else {
            return Ok(None);
        };
        season.end_date = end;
        Ok(Some(season.clone()))
    }
}

#[cfg(test)]
mod tests {
    use plansow_db::models::{ActionType, NewPlantingMember, StartType};

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn planting(store: &InMemoryStore) -> Planting {
        let plant = store
            .add_plant(NewPlant {
                name: "Pea".into(),
                growth_days: Some(70),
                ..Default::default()
            })
            .await;
        store
            .insert_planting(&NewPlanting {
                bed_id: Uuid::new_v4(),
                start_date: d(2024, 3, 1),
                end_date: None,
                start_type: StartType::Seed,
                notes: None,
                members: vec![NewPlantingMember::new(plant.id, 10)],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_dates_are_skipped() {
        let store = InMemoryStore::new();
        let planting = planting(&store).await;
        let water = store
            .add_care_action(NewCareAction {
                name: "Water".into(),
                description: None,
                action_type: ActionType::Watering,
                default_frequency_days: None,
            })
            .await;

        let new = NewAssignment {
            planting_id: planting.id,
            template: EventKind::CareAction(water.id),
            anchor_date: d(2024, 3, 1),
            frequency_days: None,
            notes: None,
        };
        let (_, first) = store.insert_assignment(&new, &[d(2024, 3, 1)]).await.unwrap();
        let (_, second) = store
            .insert_assignment(&new, &[d(2024, 3, 1), d(2024, 3, 2)])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].scheduled_date, d(2024, 3, 2));
        assert_eq!(store.assignment_count().await, 2);
    }

    #[tokio::test]
    async fn unknown_template_is_rejected() {
        let store = InMemoryStore::new();
        let planting = planting(&store).await;
        let result = store
            .insert_events(&[NewEvent {
                planting_id: planting.id,
                kind: EventKind::Treatment(Uuid::new_v4()),
                scheduled_date: d(2024, 3, 1),
                notes: None,
            }])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn season_names_are_unique() {
        let store = InMemoryStore::new();
        let new = NewSeason {
            name: "2024".into(),
            start_date: d(2024, 1, 1),
            ..Default::default()
        };
        store.insert_season(&new).await.unwrap();
        assert!(store.insert_season(&new).await.is_err());
    }
}
