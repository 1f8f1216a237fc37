//! Headless game runner implementation.
//!
//! Reads one JSON command per line and answers each with exactly one JSON
//! response line. Input actions stay held until changed, so a controller
//! can `move` once and then `tick` many times.

use std::io::{self, BufRead, Write};

use horde_core::math::Vec2;
use horde_core::player::Player;
use horde_core::simulation::Scene;

use crate::protocol::{Command, Response};

/// Headless runner for externally controlled gameplay.
#[derive(Debug)]
pub struct HeadlessRunner {
    scene: Scene,
    tick_ms: i64,
}

impl HeadlessRunner {
    /// Create a runner driving `scene` with a fixed `tick_ms` timestep.
    #[must_use]
    pub fn new(scene: Scene, tick_ms: i64) -> Self {
        Self { scene, tick_ms }
    }

    /// The driven scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Run the session over stdin/stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_session(stdin.lock(), stdout.lock())
    }

    /// Run a session: emit `ready`, then answer every command line until
    /// `quit` or end of input.
    pub fn run_session<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(&mut output, &Response::ready(self.scene.tick()))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    write_response(&mut output, &Response::error(format!("Parse error: {e}"), None))?;
                    continue;
                }
            };

            tracing::debug!(cmd = command.name(), "Command received");
            let quit = matches!(command, Command::Quit);
            let response = self.handle(&command);
            write_response(&mut output, &response)?;
            if quit {
                tracing::info!("Session ended by controller");
                break;
            }
        }
        Ok(())
    }

    /// Apply one command and produce its response.
    pub fn handle(&mut self, command: &Command) -> Response {
        let name = command.name();
        match command {
            Command::Tick { count } => {
                for _ in 0..*count {
                    self.scene.on_tick(self.tick_ms);
                }
                Response::state(&self.scene)
            }
            Command::Query => Response::state(&self.scene),
            Command::Hash => Response::Hash {
                tick: self.scene.tick(),
                hash: self.scene.state_hash(),
            },
            Command::Quit => Response::ack(name),
            Command::Move { axis, magnitude } => {
                self.with_player(name, |p| p.set_movement(*axis, *magnitude))
            }
            Command::UseWeapon { active } => self.with_player(name, |p| p.set_using_weapon(*active)),
            Command::Aim { x, y } => {
                if !x.is_finite() || !y.is_finite() {
                    return Response::error("aim direction must be finite", Some(name));
                }
                self.with_player(name, |p| p.set_target_direction(Vec2::new(*x, *y)))
            }
            Command::Grab { pressed } => self.with_player(name, |p| p.set_grab_pressed(*pressed)),
            Command::SwitchWeapon => self.with_player(name, Player::change_active_weapon),
        }
    }

    fn with_player(&mut self, name: &str, action: impl FnOnce(&mut Player)) -> Response {
        match self.scene.player_mut() {
            Some(player) => {
                action(player);
                Response::ack(name)
            }
            None => Response::error("no player in scene", Some(name)),
        }
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::player::Axis;
    use horde_test_utils::fixtures::{pistol, player_entity};

    fn runner() -> HeadlessRunner {
        let mut scene = Scene::default();
        scene.add_entity(player_entity(Vec2::ZERO, 100.0, Some(pistol(1.0))));
        HeadlessRunner::new(scene, 16)
    }

    fn session(runner: &mut HeadlessRunner, input: &str) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        runner.run_session(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_session_starts_ready() {
        let lines = session(&mut runner(), "");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "ready");
        assert_eq!(lines[0]["version"], "1.0");
    }

    #[test]
    fn test_move_then_tick_moves_player() {
        let mut runner = runner();
        let lines = session(
            &mut runner,
            "{\"cmd\":\"move\",\"axis\":\"right\",\"magnitude\":1.0}\n{\"cmd\":\"tick\",\"count\":10}\n",
        );
        assert_eq!(lines[1]["type"], "ack");
        assert_eq!(lines[2]["type"], "state");
        assert_eq!(lines[2]["tick"], 10);
        // 10 ticks of 16 ms at 0.05 px/ms
        let x = runner.scene().player_entity().unwrap().body.position.x();
        assert!((x - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_line_reports_error_and_continues() {
        let lines = session(&mut runner(), "not json\n{\"cmd\":\"hash\"}\n");
        assert_eq!(lines[1]["type"], "error");
        assert_eq!(lines[2]["type"], "hash");
    }

    #[test]
    fn test_quit_stops_reading() {
        let lines = session(&mut runner(), "{\"cmd\":\"quit\"}\n{\"cmd\":\"query\"}\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["cmd"], "quit");
    }

    #[test]
    fn test_player_commands_without_player() {
        let mut runner = HeadlessRunner::new(Scene::default(), 16);
        let response = runner.handle(&Command::Move {
            axis: Axis::Up,
            magnitude: 1.0,
        });
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn test_switch_weapon_toggles_slot() {
        let mut runner = runner();
        runner.handle(&Command::SwitchWeapon);
        let lines = session(&mut runner, "{\"cmd\":\"query\"}\n");
        assert_eq!(lines[1]["player"]["active_slot"], 1);
    }

    #[test]
    fn test_same_commands_same_hash() {
        let script = "{\"cmd\":\"use_weapon\",\"active\":true}\n{\"cmd\":\"aim\",\"x\":1.0,\"y\":0.5}\n{\"cmd\":\"tick\",\"count\":50}\n{\"cmd\":\"hash\"}\n";
        let a = session(&mut runner(), script);
        let b = session(&mut runner(), script);
        assert_eq!(a[4]["hash"], b[4]["hash"]);
    }
}
