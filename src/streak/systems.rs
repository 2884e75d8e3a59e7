//! Daily claim handling and periodic claim reminders.
use bevy::prelude::*;

use crate::{
    core::plugin::TickClock,
    playtime::components::{ClientPlatform, HeldPermissions, SessionIndex, Subject},
    rewards::{
        catalog::RewardCatalog,
        delivery::{ActiveRewardSink, Recipient},
    },
    storage::{ActiveRewardUserStore, RewardUser},
    streak::{
        events::{ClaimDailyReward, DailyRewardClaimed},
        state::{
            claimable_day, complete_claim, ReminderSettings, RewardCalendar, StreakError,
            StreakSettings,
        },
    },
};

/// Tick at which the next reminder round is due.
#[derive(Resource, Debug, Default)]
pub struct ReminderSchedule {
    next_due: Option<u64>,
}

/// Delivers the streak bundle plus any hourly bonus, then advances and saves the streak.
#[allow(clippy::too_many_arguments)]
pub fn claim_daily_rewards(
    mut requests: MessageReader<ClaimDailyReward>,
    index: Res<SessionIndex>,
    catalog: Res<RewardCatalog>,
    settings: Res<StreakSettings>,
    calendar: Res<RewardCalendar>,
    sink: Res<ActiveRewardSink>,
    store: Res<ActiveRewardUserStore>,
    mut sessions: Query<(&Subject, &ClientPlatform, &HeldPermissions, &mut RewardUser)>,
    mut claimed: MessageWriter<DailyRewardClaimed>,
) {
    let today = calendar.today();
    for request in requests.read() {
        let entity = match index.require(request.subject) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(target: "streak", "Daily claim rejected: {}", err);
                continue;
            }
        };
        let Ok((subject, platform, held, mut user)) = sessions.get_mut(entity) else {
            continue;
        };

        let day = match claimable_day(&user, today, &settings) {
            Ok(day) => day,
            Err(err) => {
                info!(target: "streak", "{}", err);
                continue;
            }
        };
        let bundle = match catalog.resolve_by_day(day) {
            Ok(bundle) => bundle,
            Err(source) => {
                let err = StreakError::NoReward {
                    subject: subject.id,
                    source,
                };
                error!(target: "streak", "{}", err);
                continue;
            }
        };

        let recipient = Recipient::new(subject.id, &subject.name, *platform);
        bundle.deliver(&recipient, sink.sink());

        let held_tiers = catalog.held_tiers(held.iter());
        let bonus = catalog.resolve_by_permission_tier(&held_tiers);
        if let Some(bonus) = bonus {
            debug!(
                target: "streak",
                "Applying {} bonus (x{}) for {}",
                bonus.tier, bonus.multiplier, subject.name
            );
            bonus.scaled_bundle().deliver(&recipient, sink.sink());
        }

        complete_claim(&mut user, day, today);
        if let Err(err) = store.store().save(&user) {
            error!(target: "streak", "Failed to save streak for {}: {}", subject.id, err);
        }

        info!(target: "streak", "{} collected day {} reward", subject.name, day);
        claimed.write(DailyRewardClaimed {
            subject: subject.id,
            day,
            bonus_tier: bonus.map(|bonus| bonus.tier.to_string()),
        });
    }
}

/// Every reminder period, nudges live subjects that have not claimed today.
pub fn send_reminders(
    clock: Res<TickClock>,
    settings: Res<ReminderSettings>,
    calendar: Res<RewardCalendar>,
    sink: Res<ActiveRewardSink>,
    mut schedule: ResMut<ReminderSchedule>,
    sessions: Query<(&Subject, &ClientPlatform, &RewardUser)>,
) {
    if !settings.is_enabled() {
        schedule.next_due = None;
        return;
    }

    let period = settings.period.as_secs().max(1);
    let now = clock.elapsed_ticks();
    let due = *schedule.next_due.get_or_insert(now + period);
    if now < due {
        return;
    }
    schedule.next_due = Some(now + period);

    let today = calendar.today();
    for (subject, platform, user) in sessions.iter() {
        if user.has_collected_on(today) {
            continue;
        }
        let recipient = Recipient::new(subject.id, &subject.name, *platform);
        sink.sink().notify(&recipient, &settings.message);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use super::*;
    use crate::{
        playtime::components::SubjectId,
        rewards::{
            catalog::{HourlyBonusTable, HourlyBonusTier, LoopLength, RewardTable},
            delivery::{CommandSender, RecordingSink, SinkCall},
            types::{CommandReward, ItemGrant, Reward, RewardBundle, SizeTag},
        },
        storage::{InMemoryStore, RewardUserStore},
    };

    const TODAY: i64 = 20_000;

    #[derive(Resource, Default)]
    struct SeenClaims(Vec<DailyRewardClaimed>);

    fn collect_claims(mut reader: MessageReader<DailyRewardClaimed>, mut seen: ResMut<SeenClaims>) {
        seen.0.extend(reader.read().cloned());
    }

    fn command(text: &str) -> Reward {
        Reward::Command(CommandReward {
            command: text.to_string(),
        })
    }

    fn catalog() -> RewardCatalog {
        let mut days = BTreeMap::new();
        days.insert(1, RewardBundle::new(SizeTag::Small, vec![command("say day one %user%")]));
        days.insert(2, RewardBundle::new(SizeTag::Medium, vec![command("say day two %user%")]));
        let bonus = HourlyBonusTable::new(vec![HourlyBonusTier {
            key: "vip".to_string(),
            multiplier: 2.5,
            bundle: RewardBundle::new(
                SizeTag::Small,
                vec![Reward::Item(ItemGrant::new(
                    "diamond".parse().expect("valid material"),
                    3,
                ))],
            ),
        }]);
        RewardCatalog::new(RewardTable::new(days, None), LoopLength::NoLoop, Some(bonus))
    }

    fn build_app(store: InMemoryStore, sink: RecordingSink) -> App {
        let mut app = App::new();
        app.add_message::<ClaimDailyReward>()
            .add_message::<DailyRewardClaimed>()
            .init_resource::<SessionIndex>()
            .init_resource::<ReminderSchedule>()
            .init_resource::<SeenClaims>()
            .insert_resource(TickClock::default())
            .insert_resource(catalog())
            .insert_resource(StreakSettings { days_reset: true })
            .insert_resource(ReminderSettings {
                period: Duration::from_secs(600),
                message: "Claim your reward".to_string(),
            })
            .insert_resource(RewardCalendar::fixed(TODAY))
            .insert_resource(ActiveRewardSink::new(Box::new(sink)))
            .insert_resource(ActiveRewardUserStore::new(Box::new(store)))
            .add_systems(
                Update,
                (claim_daily_rewards, collect_claims, send_reminders).chain(),
            );
        app
    }

    fn spawn_subject(app: &mut App, user: RewardUser, permissions: &[&str]) {
        let subject = user.subject;
        let entity = app
            .world_mut()
            .spawn((
                Subject::new(subject, user.name.clone()),
                ClientPlatform::Java,
                HeldPermissions::new(permissions.iter().map(|node| node.to_string())),
                user,
            ))
            .id();
        app.world_mut()
            .resource_mut::<SessionIndex>()
            .insert(subject, entity);
    }

    fn claim(app: &mut App, id: u64) {
        app.world_mut().write_message(ClaimDailyReward {
            subject: SubjectId::new(id),
        });
        app.update();
    }

    #[test]
    fn claim_delivers_day_bundle_and_scaled_bonus() {
        let store = InMemoryStore::default();
        let sink = RecordingSink::default();
        let mut app = build_app(store.clone(), sink.clone());
        spawn_subject(
            &mut app,
            RewardUser::new(SubjectId::new(1), "Alex"),
            &["activityrewarder.bonus.vip"],
        );

        claim(&mut app, 1);

        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Command {
                    subject: SubjectId::new(1),
                    sender: CommandSender::Console,
                    command: "say day one Alex".to_string(),
                },
                SinkCall::Item {
                    subject: SubjectId::new(1),
                    material: "diamond".to_string(),
                    amount: 7,
                },
            ]
        );

        let saved = store.get(SubjectId::new(1)).expect("saved after claim");
        assert_eq!(saved.day_num, 2);
        assert_eq!(saved.last_collected_day, Some(TODAY));
        assert_eq!(
            app.world().resource::<SeenClaims>().0,
            vec![DailyRewardClaimed {
                subject: SubjectId::new(1),
                day: 1,
                bonus_tier: Some("vip".to_string()),
            }]
        );
    }

    #[test]
    fn second_claim_on_same_day_gives_nothing() {
        let sink = RecordingSink::default();
        let mut app = build_app(InMemoryStore::default(), sink.clone());
        spawn_subject(&mut app, RewardUser::new(SubjectId::new(1), "Alex"), &[]);

        claim(&mut app, 1);
        claim(&mut app, 1);

        assert_eq!(sink.calls().len(), 1);
        assert_eq!(app.world().resource::<SeenClaims>().0.len(), 1);
    }

    #[test]
    fn missing_bundle_leaves_streak_untouched() {
        let store = InMemoryStore::default();
        let sink = RecordingSink::default();
        let mut app = build_app(store.clone(), sink.clone());
        let mut user = RewardUser::new(SubjectId::new(1), "Alex");
        user.day_num = 3;
        user.last_collected_day = Some(TODAY - 1);
        spawn_subject(&mut app, user, &[]);

        claim(&mut app, 1);

        assert!(sink.calls().is_empty());
        assert_eq!(store.get(SubjectId::new(1)), None);
    }

    #[test]
    fn reminders_skip_subjects_who_already_claimed() {
        let store = InMemoryStore::default();
        let sink = RecordingSink::default();
        let mut app = build_app(store.clone(), sink.clone());
        spawn_subject(&mut app, RewardUser::new(SubjectId::new(1), "Alex"), &[]);
        let mut collected = RewardUser::new(SubjectId::new(2), "Sam");
        collected.last_collected_day = Some(TODAY);
        store.save(&collected).unwrap();
        spawn_subject(&mut app, collected, &[]);

        app.update();
        app.world_mut().resource_mut::<TickClock>().push_ticks(599);
        app.update();
        assert!(sink.calls().is_empty());

        app.world_mut().resource_mut::<TickClock>().push_ticks(1);
        app.update();
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Notify {
                subject: SubjectId::new(1),
                message: "Claim your reward".to_string(),
            }]
        );
    }

    #[test]
    fn disabled_reminders_stay_silent() {
        let sink = RecordingSink::default();
        let mut app = build_app(InMemoryStore::default(), sink.clone());
        app.insert_resource(ReminderSettings {
            period: Duration::ZERO,
            message: "unused".to_string(),
        });
        spawn_subject(&mut app, RewardUser::new(SubjectId::new(1), "Alex"), &[]);

        app.world_mut().resource_mut::<TickClock>().push_ticks(10_000);
        app.update();

        assert!(sink.calls().is_empty());
    }
}
