//! Session lifecycle and per-tick accrual systems.
use bevy::prelude::*;

use crate::{
    core::plugin::TickClock,
    playtime::{
        components::{
            HeldPermissions, SessionIndex, Subject, SubjectPosition, UnmatchedSessionEnds,
        },
        events::{MinuteElapsed, PermissionsChanged, PositionReported, SessionEnded, SessionStarted},
        tracker::{PlaytimeSettings, PlaytimeTracker},
    },
    storage::{ActiveRewardUserStore, RewardUser},
};

/// Saves accrued minutes, then despawns the tracker entity.
///
/// Runs ahead of `start_sessions`, so an end and a start for a live subject in the
/// same frame close the old session and open a new one from the saved record.
pub fn end_sessions(
    mut commands: Commands,
    mut ended: MessageReader<SessionEnded>,
    mut index: ResMut<SessionIndex>,
    mut unmatched: ResMut<UnmatchedSessionEnds>,
    store: Res<ActiveRewardUserStore>,
    mut sessions: Query<(&PlaytimeTracker, &mut RewardUser)>,
) {
    unmatched.clear();
    for message in ended.read() {
        let Some(entity) = index.remove(message.subject) else {
            debug!(
                target: "playtime",
                "Session end for {} has no active session yet",
                message.subject
            );
            unmatched.record(message.subject);
            continue;
        };

        if let Ok((tracker, mut user)) = sessions.get_mut(entity) {
            user.minutes_played = tracker.global_minutes();
            if let Err(err) = store.store().save(&user) {
                error!(target: "playtime", "Failed to save {} on session end: {}", message.subject, err);
            }
            info!(
                target: "playtime",
                "Session ended for {} after {} active minutes",
                user.name,
                tracker.session_minutes()
            );
        }

        commands.entity(entity).despawn();
    }
}

/// Loads the durable record and spawns a tracker entity for every new session.
pub fn start_sessions(
    mut commands: Commands,
    mut started: MessageReader<SessionStarted>,
    mut index: ResMut<SessionIndex>,
    mut unmatched: ResMut<UnmatchedSessionEnds>,
    store: Res<ActiveRewardUserStore>,
) {
    for message in started.read() {
        if unmatched.take(message.subject) {
            info!(
                target: "playtime",
                "{} ({}) connected and left within one frame; no session started",
                message.name,
                message.subject
            );
            continue;
        }
        if index.get(message.subject).is_some() {
            warn!(
                target: "playtime",
                "{} ({}) already has a live session; ignoring duplicate start",
                message.subject,
                message.name
            );
            continue;
        }

        let user = match store.load_or_new(message.subject, &message.name) {
            Ok(user) => user,
            Err(err) => {
                error!(target: "playtime", "Session for {} not started: {}", message.subject, err);
                continue;
            }
        };

        let entity = commands
            .spawn((
                Subject::new(message.subject, message.name.clone()),
                message.position,
                message.platform,
                HeldPermissions::new(message.permissions.iter().cloned()),
                PlaytimeTracker::new(message.position, user.minutes_played),
                user,
                Name::new(format!("{} ({})", message.name, message.subject)),
            ))
            .id();
        index.insert(message.subject, entity);

        info!(target: "playtime", "Session started for {} ({})", message.name, message.subject);
    }
}

/// Stores the latest reported position of each live subject.
pub fn apply_position_reports(
    mut reports: MessageReader<PositionReported>,
    index: Res<SessionIndex>,
    mut positions: Query<&mut SubjectPosition>,
) {
    for report in reports.read() {
        let entity = match index.require(report.subject) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(target: "playtime", "Dropping position report: {}", err);
                continue;
            }
        };
        if let Ok(mut position) = positions.get_mut(entity) {
            *position = report.position;
        }
    }
}

pub fn apply_permission_changes(
    mut changes: MessageReader<PermissionsChanged>,
    index: Res<SessionIndex>,
    mut held: Query<&mut HeldPermissions>,
) {
    for change in changes.read() {
        let entity = match index.require(change.subject) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(target: "playtime", "Dropping permission update: {}", err);
                continue;
            }
        };
        if let Ok(mut permissions) = held.get_mut(entity) {
            *permissions = HeldPermissions::new(change.permissions.iter().cloned());
        }
    }
}

/// Runs every pending one-second tick against every live tracker.
pub fn tick_playtime_trackers(
    mut clock: ResMut<TickClock>,
    settings: Res<PlaytimeSettings>,
    mut trackers: Query<(&Subject, &SubjectPosition, &mut PlaytimeTracker)>,
    mut minutes: MessageWriter<MinuteElapsed>,
) {
    let ticks = clock.take_ticks();
    if ticks == 0 {
        return;
    }

    for (subject, position, mut tracker) in trackers.iter_mut() {
        for _ in 0..ticks {
            let outcome = tracker.tick(*position, settings.ignore_afk);
            if outcome.became_afk {
                debug!(target: "playtime", "{} is now AFK", subject.name);
            }
            if outcome.left_afk {
                debug!(target: "playtime", "{} is no longer AFK", subject.name);
            }
            if let Some(global_minutes) = outcome.minute_elapsed {
                minutes.write(MinuteElapsed {
                    subject: subject.id,
                    global_minutes,
                });
            }
        }
    }
}
