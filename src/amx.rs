//! Akai AMX mapping.
//!
//! The AMX has two deck units sharing one browse encoder. Each unit's
//! `search` button holds a layer that swaps the deck basics and the library
//! for that deck's extras (loops, beat jumps, play position). The `shift`
//! button shifts the library, deck basics and deck extras.

use crate::host::Host;
use crate::midi::{Channel, ControlAddress};
use crate::registry::{ControlRegistry, DeckMapping};
use crate::surface::{
    ButtonKind, Component, Container, ContainerId, ControlSurface, EncoderStyle, LayerId, Mode,
    ShiftId,
};

const LIBRARY: &str = "[Library]";
const MASTER: &str = "[Master]";

/// Containers belonging to one deck unit.
#[derive(Debug, Clone, Copy)]
pub struct DeckContainers {
    pub mixer_line: ContainerId,
    pub equalizer: ContainerId,
    pub basics: ContainerId,
    pub extras: ContainerId,
}

/// Ids of everything the AMX mapping put on a surface.
#[derive(Debug, Clone)]
pub struct AmxMapping {
    pub decks: [DeckMapping; 2],
    pub shift: ShiftId,
    pub layers: [LayerId; 2],
    pub library: ContainerId,
    pub master: ContainerId,
    pub mixer_lines: ContainerId,
    pub deck_basics: ContainerId,
    pub deck_extras: ContainerId,
    pub deck_containers: [DeckContainers; 2],
}

/// Status byte helpers that pass a missing registry entry through as `None`.
#[derive(Clone, Copy)]
struct Wiring {
    channel: Channel,
}

impl Wiring {
    fn on(self, data: Option<u8>) -> Option<ControlAddress> {
        data.map(|data| self.channel.note_on(data))
    }

    fn off(self, data: Option<u8>) -> Option<ControlAddress> {
        data.map(|data| self.channel.note_off(data))
    }

    fn cc(self, data: Option<u8>) -> Option<ControlAddress> {
        data.map(|data| self.channel.control_change(data))
    }
}

impl AmxMapping {
    /// Put the AMX mapping on `surface`. Nothing is connected yet, see
    /// [`init`](Self::init).
    pub fn build<H: Host>(
        surface: &mut ControlSurface<H>,
        registry: &ControlRegistry,
        channel: Channel,
    ) -> Self {
        let wiring = Wiring { channel };
        let decks = [DeckMapping::new(0, 1), DeckMapping::new(1, 2)];

        let shift_data = registry.resolve("shift", None);
        let shift = surface.add_shift_controller(
            "shift",
            [wiring.on(shift_data), wiring.off(shift_data)],
        );
        let layers = decks.map(|deck| {
            let search = deck.control(registry, "search");
            surface.add_layer_controller(
                &format!("layer{}", deck.group_number()),
                [wiring.on(search), wiring.off(search)],
            )
        });

        let library = build_library(surface, registry, wiring, &decks);
        let master = build_master(surface, registry, wiring);

        let mixer_lines = surface.add_container(Container::new("mixerLines"));
        let deck_basics = surface.add_container(Container::new("deckBasics"));
        let deck_extras = surface.add_container(Container::new("deckExtras"));

        let deck_containers = decks.map(|deck| {
            let (mixer_line, equalizer) = build_mixer_line(surface, registry, wiring, deck);
            let basics = build_deck_basics(surface, registry, wiring, deck);
            let extras = build_deck_extras(surface, registry, wiring, deck, &decks);
            DeckContainers {
                mixer_line,
                equalizer,
                basics,
                extras,
            }
        });

        for containers in &deck_containers {
            insert(surface, mixer_lines, containers.mixer_line);
            insert(surface, deck_basics, containers.basics);
            insert(surface, deck_extras, containers.extras);
        }

        for (layer, containers) in layers.iter().zip(&deck_containers) {
            surface.register_default_layer(*layer, deck_basics);
            surface.register_default_layer(*layer, library);
            surface.register_alternate_layer(*layer, containers.extras);
        }

        surface.register_shift_subscriber(shift, library);
        surface.register_shift_subscriber(shift, deck_basics);
        surface.register_shift_subscriber(shift, deck_extras);

        Self {
            decks,
            shift,
            layers,
            library,
            master,
            mixer_lines,
            deck_basics,
            deck_extras,
            deck_containers,
        }
    }

    /// Connect the default layer. Returns how many components failed to
    /// connect.
    pub fn init<H: Host>(&self, surface: &mut ControlSurface<H>) -> usize {
        [self.master, self.mixer_lines, self.library, self.deck_basics]
            .into_iter()
            .map(|container| surface.connect_all(container))
            .sum()
    }

    pub fn shutdown<H: Host>(&self, surface: &mut ControlSurface<H>) {
        for container in [
            self.mixer_lines,
            self.deck_basics,
            self.deck_extras,
            self.library,
            self.master,
        ] {
            surface.shutdown(container);
        }
    }
}

fn insert<H: Host>(surface: &mut ControlSurface<H>, parent: ContainerId, child: ContainerId) {
    if let Err(err) = surface.insert(parent, child) {
        log::warn!("{err}");
    }
}

fn build_library<H: Host>(
    surface: &mut ControlSurface<H>,
    registry: &ControlRegistry,
    wiring: Wiring,
    decks: &[DeckMapping; 2],
) -> ContainerId {
    let library = surface.add_container(Container::new("library").with_group(LIBRARY));
    let [left, right] = decks;

    surface.attach(
        library,
        Component::encoder("browse", EncoderStyle::Move)
            .input(wiring.cc(registry.resolve("browseTurn", None)))
            .modes(Mode::key("MoveVertical"), Mode::key("MoveHorizontal")),
    );
    surface.attach(
        library,
        Component::button("browseClick", ButtonKind::Push)
            .input(wiring.on(registry.resolve("browseClick", None)))
            .modes(Mode::key("GoToItem"), Mode::key("sort_focused_column")),
    );
    surface.attach(
        library,
        Component::button("loadLeft", ButtonKind::Push)
            .input(wiring.on(left.control(registry, "load")))
            .modes(
                Mode::key("LoadSelectedTrack").with_group(left.group()),
                Mode::key("MoveFocusBackward").with_group(LIBRARY),
            ),
    );
    surface.attach(
        library,
        Component::button("loadRight", ButtonKind::Push)
            .input(wiring.on(right.control(registry, "load")))
            .modes(
                Mode::key("LoadSelectedTrack").with_group(right.group()),
                Mode::key("MoveFocusForward").with_group(LIBRARY),
            ),
    );
    library
}

fn build_master<H: Host>(
    surface: &mut ControlSurface<H>,
    registry: &ControlRegistry,
    wiring: Wiring,
) -> ContainerId {
    let master = surface.add_container(Container::new("master").with_group(MASTER));
    let pots = [
        ("cueMix", "headMix"),
        ("cueGain", "headGain"),
        ("master", "gain"),
    ];
    for (control, key) in pots {
        surface.attach(
            master,
            Component::pot(control)
                .input(wiring.cc(registry.resolve(control, None)))
                .key(key),
        );
    }
    // TODO: map xfadeRev once the host exposes a crossfader reverse control.
    surface.attach(
        master,
        Component::pot("crossFader")
            .input(wiring.cc(registry.resolve("crossFader", None)))
            .fine(wiring.cc(registry.resolve("crossFaderFine", None)))
            .key("crossfader"),
    );
    master
}

/// A 14-bit pot wired to `<control>` and `<control>Fine` of the deck.
fn deck_pot(
    registry: &ControlRegistry,
    wiring: Wiring,
    deck: DeckMapping,
    control: &str,
    key: &str,
) -> Component {
    Component::pot(format!("{control}{}", deck.group_number()))
        .input(wiring.cc(deck.control(registry, control)))
        .fine(wiring.cc(deck.control(registry, &format!("{control}Fine"))))
        .key(key)
}

fn build_mixer_line<H: Host>(
    surface: &mut ControlSurface<H>,
    registry: &ControlRegistry,
    wiring: Wiring,
    deck: DeckMapping,
) -> (ContainerId, ContainerId) {
    let n = deck.group_number();
    let mixer_line = surface.add_container(
        Container::new(format!("mixerLine{n}")).with_group(deck.group()),
    );
    let equalizer = surface.add_container(
        Container::new(format!("equalizerRack{n}"))
            .with_group(format!("[EqualizerRack1_[Channel{n}]_Effect1]")),
    );

    for (control, key) in [
        ("eqTreble", "parameter3"),
        ("eqMid", "parameter2"),
        ("eqBass", "parameter1"),
    ] {
        surface.attach(equalizer, deck_pot(registry, wiring, deck, control, key));
    }
    insert(surface, mixer_line, equalizer);

    surface.attach(
        mixer_line,
        deck_pot(registry, wiring, deck, "filter", "super1")
            .group(format!("[QuickEffectRack1_[Channel{n}]]")),
    );
    surface.attach(
        mixer_line,
        deck_pot(registry, wiring, deck, "lineFader", "volume"),
    );

    (mixer_line, equalizer)
}

fn build_deck_basics<H: Host>(
    surface: &mut ControlSurface<H>,
    registry: &ControlRegistry,
    wiring: Wiring,
    deck: DeckMapping,
) -> ContainerId {
    let n = deck.group_number();
    let basics = surface.add_container(
        Container::new(format!("deckBasics{n}")).with_group(deck.group()),
    );
    let sync = deck.control(registry, "sync");
    let cue = deck.control(registry, "cue");
    let play = deck.control(registry, "play");
    let pfl = deck.control(registry, "pfl");

    // Gain doubles as pitch while shifted.
    surface.attach(
        basics,
        Component::encoder(format!("gain{n}"), EncoderStyle::Step)
            .input(wiring.cc(deck.control(registry, "gain")))
            .modes(
                Mode::key("pregain").with_step(0.025),
                Mode::key("rate").with_step(-0.005),
            ),
    );
    surface.attach(
        basics,
        Component::button(format!("sync{n}"), ButtonKind::Toggle)
            .input(wiring.on(sync))
            .output(wiring.on(sync))
            .key("sync_enabled"),
    );
    surface.attach(
        basics,
        Component::button(format!("cue{n}"), ButtonKind::Push)
            .input(wiring.on(cue))
            .input(wiring.off(cue))
            .output(wiring.on(cue))
            .out_key("cue_indicator")
            .key("cue_default"),
    );
    surface.attach(
        basics,
        Component::button(format!("play{n}"), ButtonKind::Toggle)
            .input(wiring.on(play))
            .output(wiring.on(play))
            .out_key("play_indicator")
            .key("play"),
    );
    surface.attach(
        basics,
        Component::button(format!("pflOn{n}"), ButtonKind::Push)
            .input(wiring.on(pfl))
            .key("pfl"),
    );
    surface.attach(
        basics,
        Component::button(format!("pflOff{n}"), ButtonKind::Push)
            .input(wiring.off(pfl))
            .key("pfl"),
    );
    basics
}

/// The extras of one deck reuse controls of both units: the left and right
/// buttons of a row become a pair of actions for this deck.
fn build_deck_extras<H: Host>(
    surface: &mut ControlSurface<H>,
    registry: &ControlRegistry,
    wiring: Wiring,
    deck: DeckMapping,
    decks: &[DeckMapping; 2],
) -> ContainerId {
    let n = deck.group_number();
    let extras = surface.add_container(
        Container::new(format!("deckExtras{n}")).with_group(deck.group()),
    );
    let [left, right] = decks;
    let pair = |name: &str| {
        (
            deck.control_at(registry, name, left.index()),
            deck.control_at(registry, name, right.index()),
        )
    };

    surface.attach(
        extras,
        Component::encoder(format!("playPosition{n}"), EncoderStyle::Step)
            .input(wiring.cc(registry.resolve("browseTurn", None)))
            .key("playposition")
            .modes(Mode::step(0.007), Mode::step(0.0002)),
    );
    surface.attach(
        extras,
        Component::button(format!("quantize{n}"), ButtonKind::Toggle)
            .input(wiring.on(registry.resolve("browseClick", None)))
            .modes(Mode::key("quantize"), Mode::key("keylock")),
    );

    let (gain_left, gain_right) = pair("gain");
    surface.attach(
        extras,
        Component::encoder(format!("beatloopSize{n}"), EncoderStyle::Scale(2.0))
            .input(wiring.cc(gain_left))
            .key("beatloop_size"),
    );
    surface.attach(
        extras,
        Component::encoder(format!("beatjumpSize{n}"), EncoderStyle::Scale(2.0))
            .input(wiring.cc(gain_right))
            .key("beatjump_size"),
    );

    let (load_left, load_right) = pair("load");
    surface.attach(
        extras,
        Component::button(format!("jumpBack{n}"), ButtonKind::Push)
            .input(wiring.on(load_left))
            .input(wiring.off(load_left))
            .output(wiring.on(load_left))
            .key("beatjump_backward"),
    );
    surface.attach(
        extras,
        Component::button(format!("jumpForward{n}"), ButtonKind::Push)
            .input(wiring.on(load_right))
            .input(wiring.off(load_right))
            .output(wiring.on(load_right))
            .key("beatjump_forward"),
    );

    let (sync_left, sync_right) = pair("sync");
    surface.attach(
        extras,
        Component::button(format!("loopActivate{n}"), ButtonKind::Push)
            .input(wiring.on(sync_left))
            .key("beatloop_activate"),
    );
    surface.attach(
        extras,
        Component::button(format!("reloop{n}"), ButtonKind::Push)
            .input(wiring.on(sync_right))
            .input(wiring.off(sync_right))
            .key("reloop_toggle"),
    );

    let (cue_left, cue_right) = pair("cue");
    for (name, data, key) in [
        ("loopIn", cue_left, "loop_in"),
        ("loopOut", cue_right, "loop_out"),
    ] {
        surface.attach(
            extras,
            Component::button(format!("{name}{n}"), ButtonKind::Push)
                .input(wiring.on(data))
                .input(wiring.off(data))
                .key(key),
        );
    }

    let (play_left, play_right) = pair("play");
    for (name, data, key) in [
        ("rateTempDown", play_left, "rate_temp_down"),
        ("rateTempUp", play_right, "rate_temp_up"),
    ] {
        surface.attach(
            extras,
            Component::button(format!("{name}{n}"), ButtonKind::Push)
                .input(wiring.on(data))
                .input(wiring.off(data))
                .modes(Mode::key(key), Mode::key(format!("{key}_small"))),
        );
    }

    extras
}
