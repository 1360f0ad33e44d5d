//! Integration tests for the scheduling facade over the in-memory store.

use chrono::NaiveDate;
use uuid::Uuid;

use plansow_core::ScheduleError;
use plansow_core::progress::Phase;
use plansow_core::service::{NewMaintenance, SchedulingService, group_by_status};
use plansow_core::store::InMemoryStore;
use plansow_db::models::{
    ActionType, EventFilter, EventKind, EventStatus, NewCareAction, NewPlant, NewPlantCare,
    NewPlanting, NewPlantingMember, NewTreatment, Planting, StartType,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct Garden {
    service: SchedulingService<InMemoryStore>,
    bed: Uuid,
    tomato: Uuid,
}

async fn garden() -> Garden {
    let store = InMemoryStore::new();
    let tomato = store
        .add_plant(NewPlant {
            name: "Tomato".into(),
            growth_days: Some(80),
            harvest_period_days: Some(60),
            ..Default::default()
        })
        .await;
    Garden {
        service: SchedulingService::new(store),
        bed: Uuid::new_v4(),
        tomato: tomato.id,
    }
}

impl Garden {
    async fn planting(&self, start: NaiveDate, end: Option<NaiveDate>) -> Planting {
        self.service
            .create_planting(
                NewPlanting {
                    bed_id: self.bed,
                    start_date: start,
                    end_date: end,
                    start_type: StartType::Transplant,
                    notes: None,
                    members: vec![NewPlantingMember::new(self.tomato, 6)],
                },
                start,
            )
            .await
            .expect("create planting")
            .value
    }

    async fn treatment(&self, every: Option<i32>) -> EventKind {
        let t = self
            .service
            .store()
            .add_treatment(NewTreatment {
                name: "Horsetail decoction".into(),
                default_frequency_days: every,
                is_ecological: true,
                ..Default::default()
            })
            .await;
        EventKind::Treatment(t.id)
    }

    async fn care(&self, name: &str, every: Option<i32>) -> EventKind {
        let c = self
            .service
            .store()
            .add_care_action(NewCareAction {
                name: name.into(),
                description: None,
                action_type: ActionType::Pruning,
                default_frequency_days: every,
            })
            .await;
        EventKind::CareAction(c.id)
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weekly_treatment_until_planting_end() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), Some(d(2024, 1, 22))).await;
    let spray = g.treatment(None).await;

    let outcome = g
        .service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2024, 1, 1)).every(7))
        .await
        .expect("add maintenance");

    let dates: Vec<_> = outcome
        .created_events
        .iter()
        .map(|e| e.scheduled_date)
        .collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15), d(2024, 1, 22)]
    );
    assert_eq!(outcome.duplicates_skipped, 0);
    assert_eq!(outcome.assignment.frequency_days, Some(7));
    assert!(outcome.created_events.iter().all(|e| e.kind == spray));
}

#[tokio::test]
async fn anchor_before_planting_start_is_rejected() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), None).await;
    let spray = g.treatment(Some(7)).await;

    let err = g
        .service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2023, 12, 31)))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)), "got {err:?}");
    assert_eq!(g.service.store().assignment_count().await, 0);
}

#[tokio::test]
async fn template_default_frequency_is_used() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), None).await;
    let prune = g.care("Remove suckers", Some(30)).await;

    let outcome = g
        .service
        .add_maintenance(planting.id, prune, NewMaintenance::on(d(2024, 1, 1)))
        .await
        .unwrap();
    // Open planting: 90 day horizon.
    assert_eq!(outcome.created_events.len(), 4);
    assert_eq!(outcome.assignment.frequency_days, Some(30));
}

#[tokio::test]
async fn missing_planting_or_template_is_not_found() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), None).await;
    let spray = g.treatment(None).await;

    let err = g
        .service
        .add_maintenance(Uuid::new_v4(), spray, NewMaintenance::on(d(2024, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound { entity: "planting", .. }));

    let err = g
        .service
        .add_maintenance(
            planting.id,
            EventKind::CareAction(Uuid::new_v4()),
            NewMaintenance::on(d(2024, 1, 1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound { entity: "care action", .. }));
}

#[tokio::test]
async fn repeated_assignment_does_not_duplicate_events() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), Some(d(2024, 1, 29))).await;
    let spray = g.treatment(Some(7)).await;

    g.service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2024, 1, 1)))
        .await
        .unwrap();
    let again = g
        .service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2024, 1, 8)).every(14))
        .await
        .unwrap();

    // Jan 8 and Jan 22 already exist from the weekly schedule.
    assert!(again.created_events.is_empty());
    assert_eq!(again.duplicates_skipped, 2);

    let all = g
        .service
        .list_events(&EventFilter {
            planting_id: Some(planting.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_event_defaults_to_today_and_is_one_way() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), None).await;
    let spray = g.treatment(None).await;
    let outcome = g
        .service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2024, 1, 5)))
        .await
        .unwrap();
    let event_id = outcome.created_events[0].id;

    let done = g
        .service
        .complete_event(event_id, None, d(2024, 1, 6))
        .await
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_date, Some(d(2024, 1, 6)));

    let err = g
        .service
        .complete_event(event_id, Some(d(2024, 1, 7)), d(2024, 1, 7))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::InvalidTransition {
            from: EventStatus::Completed,
            to: EventStatus::Completed
        }
    ));

    let err = g
        .service
        .complete_event(Uuid::new_v4(), None, d(2024, 1, 7))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound { entity: "event", .. }));
}

#[tokio::test]
async fn list_events_filters_and_groups() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), Some(d(2024, 2, 26))).await;
    let spray = g.treatment(None).await;
    let water = g.care("Water", None).await;

    let sprays = g
        .service
        .add_maintenance(planting.id, spray, NewMaintenance::on(d(2024, 1, 1)).every(14))
        .await
        .unwrap();
    g.service
        .add_maintenance(planting.id, water, NewMaintenance::on(d(2024, 1, 3)).every(28))
        .await
        .unwrap();
    g.service
        .complete_event(sprays.created_events[0].id, None, d(2024, 1, 1))
        .await
        .unwrap();

    let january = g
        .service
        .list_events(&EventFilter {
            from: Some(d(2024, 1, 1)),
            to: Some(d(2024, 1, 31)),
            ..Default::default()
        })
        .await
        .unwrap();
    let dates: Vec<_> = january.iter().map(|e| e.scheduled_date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 15), d(2024, 1, 29), d(2024, 1, 31)]
    );

    let groups = group_by_status(january);
    assert_eq!(groups.completed.len(), 1);
    assert_eq!(groups.pending.len(), 4);

    let other_bed = g
        .service
        .list_events(&EventFilter {
            bed_id: Some(Uuid::new_v4()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(other_bed.is_empty());
}

#[tokio::test]
async fn upcoming_events_cover_thirty_pending_days() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), Some(d(2024, 3, 31))).await;
    let water = g.care("Water", None).await;
    let outcome = g
        .service
        .add_maintenance(planting.id, water, NewMaintenance::on(d(2024, 1, 1)).every(10))
        .await
        .unwrap();
    // Jan 11 is inside the window but already done.
    g.service
        .complete_event(outcome.created_events[1].id, None, d(2024, 1, 11))
        .await
        .unwrap();

    let upcoming = g.service.upcoming_events(d(2024, 1, 11)).await.unwrap();
    let dates: Vec<_> = upcoming.iter().map(|e| e.scheduled_date).collect();
    assert_eq!(dates, vec![d(2024, 1, 21), d(2024, 1, 31), d(2024, 2, 10)]);
}

#[tokio::test]
async fn care_calendar_is_seeded_from_catalog() {
    let g = garden().await;
    let prune = g.care("Prune", None).await;
    let store = g.service.store();
    for days in [10, 45] {
        store
            .add_plant_care(NewPlantCare {
                plant_id: g.tomato,
                care_action_id: prune.template_id(),
                days_after_planting: Some(days),
                frequency_days: None,
                notes: None,
            })
            .await;
    }
    let planting = g.planting(d(2024, 4, 1), None).await;

    let created = g
        .service
        .seed_care_calendar(planting.id, d(2024, 4, 20))
        .await
        .unwrap();
    // Apr 11 is more than a week back.
    let dates: Vec<_> = created.iter().map(|e| e.scheduled_date).collect();
    assert_eq!(dates, vec![d(2024, 5, 16)]);
    assert!(created.iter().all(|e| e.kind == prune && e.assignment_id.is_none()));

    let again = g
        .service
        .seed_care_calendar(planting.id, d(2024, 4, 20))
        .await
        .unwrap();
    assert!(again.is_empty());
}

// ---------------------------------------------------------------------------
// Plantings and progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_follows_the_calendar() {
    let g = garden().await;
    let planting = g.planting(d(2024, 1, 1), None).await;

    let p = g.service.progress(planting.id, d(2024, 1, 1)).await.unwrap();
    assert_eq!((p.phase, p.growth_progress), (Phase::Growing, 0));
    assert_eq!(p.days_to_harvest, Some(80));

    let p = g.service.progress(planting.id, d(2024, 3, 21)).await.unwrap();
    assert_eq!(p.phase, Phase::Harvesting);
    assert_eq!(p.harvest_progress, Some(0));

    let p = g.service.progress(planting.id, d(2024, 5, 20)).await.unwrap();
    assert_eq!(p.phase, Phase::Ended);
    assert_eq!(p.harvest_progress, Some(100));
}

#[tokio::test]
async fn planting_overlap_in_same_bed_is_advisory() {
    let g = garden().await;
    let first = g.planting(d(2024, 3, 1), None).await;

    let second = g
        .service
        .create_planting(
            NewPlanting {
                bed_id: g.bed,
                start_date: d(2024, 4, 1),
                end_date: None,
                start_type: StartType::Seed,
                notes: None,
                members: vec![NewPlantingMember::new(g.tomato, 2)],
            },
            d(2024, 4, 1),
        )
        .await
        .unwrap();
    assert!(second.has_overlap());
    assert_eq!(second.overlaps_with, vec![first.id]);

    let empty = g
        .service
        .create_planting(
            NewPlanting {
                bed_id: g.bed,
                start_date: d(2024, 4, 1),
                ..Default::default()
            },
            d(2024, 4, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(empty, ScheduleError::Validation(_)));
}

#[tokio::test]
async fn planting_with_planned_end_is_active_and_overlaps() {
    let g = garden().await;
    let first = g.planting(d(2024, 3, 1), Some(d(2024, 6, 30))).await;
    assert!(first.is_active);

    let second = g
        .service
        .create_planting(
            NewPlanting {
                bed_id: g.bed,
                start_date: d(2024, 4, 1),
                end_date: None,
                start_type: StartType::Seedling,
                notes: None,
                members: vec![NewPlantingMember::new(g.tomato, 1)],
            },
            d(2024, 4, 1),
        )
        .await
        .unwrap();
    assert_eq!(second.overlaps_with, vec![first.id]);

    // Once the planned end has passed the first planting no longer counts.
    let third = g
        .service
        .create_planting(
            NewPlanting {
                bed_id: g.bed,
                start_date: d(2024, 8, 1),
                end_date: None,
                start_type: StartType::Seed,
                notes: None,
                members: vec![NewPlantingMember::new(g.tomato, 1)],
            },
            d(2024, 8, 1),
        )
        .await
        .unwrap();
    assert_eq!(third.overlaps_with, vec![second.value.id]);
}

#[tokio::test]
async fn close_and_reopen_planting() {
    let g = garden().await;
    let planting = g.planting(d(2024, 3, 1), None).await;

    let closed = g
        .service
        .close_planting(planting.id, None, d(2024, 7, 1))
        .await
        .unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.end_date, Some(d(2024, 7, 1)));

    let err = g
        .service
        .close_planting(planting.id, Some(d(2024, 2, 1)), d(2024, 7, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));

    let reopened = g
        .service
        .update_planting(
            planting.id,
            plansow_db::models::PlantingUpdate::new().with_end_date(None),
        )
        .await
        .unwrap();
    assert!(reopened.is_active);
    assert_eq!(reopened.end_date, None);
}
