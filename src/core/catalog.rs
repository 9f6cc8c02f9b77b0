// src/core/catalog.rs

//! The static catalog of console commands the game server understands.
//!
//! Each line is `/<verb> <grammar>`; a line of the form `/<alias> -> <verb>`
//! declares an alias. Aliases are parsed but never registered, so clients
//! have to use the canonical verb.

const RAW_CATALOG: &str = r"
/advancement (grant|revoke)
/attribute <target> <attribute> (base|get|modifier)
/ban <targets> [<reason>]
/ban-ip <target> [<reason>]
/banlist [ips|players]
/bossbar (add|get|list|remove|set)
/clear [<targets>]
/clone <begin> <end> <destination> [filtered|masked|replace]
/data (get|merge|modify|remove)
/datapack (disable|enable|list)
/debug (report|start|stop)
/defaultgamemode (adventure|creative|spectator|survival)
/deop <targets>
/difficulty [easy|hard|normal|peaceful]
/effect (clear|give)
/enchant <targets> <enchantment> [<level>]
/execute (align|anchored|as|at|facing|if|in|positioned|rotated|run|store|unless)
/experience (add|query|set)
/fill <from> <to> <block> [destroy|hollow|keep|outline|replace]
/forceload (add|query|remove)
/function <name>
/gamemode (adventure|creative|spectator|survival)
/gamerule (announceAdvancements|commandBlockOutput|disableElytraMovementCheck|disableRaids|doDaylightCycle|doEntityDrops|doFireTick|doImmediateRespawn|doInsomnia|doLimitedCrafting|doMobLoot|doMobSpawning|doPatrolSpawning|doTileDrops|doTraderSpawning|doWeatherCycle|drowningDamage|fallDamage|fireDamage|forgiveDeadPlayers|keepInventory|logAdminCommands|maxCommandChainLength|maxEntityCramming|mobGriefing|naturalRegeneration|randomTickSpeed|reducedDebugInfo|sendCommandFeedback|showDeathMessages|spawnRadius|spectatorsGenerateChunks|universalAnger)
/give <targets> <item> [<count>]
/help [<command>]
/kick <targets> [<reason>]
/kill [<targets>]
/list [uuids]
/locate (bastion_remnant|buried_treasure|desert_pyramid|endcity|fortress|igloo|jungle_pyramid|mansion|mineshaft|monument|nether_fossil|ocean_ruin|pillager_outpost|ruined_portal|shipwreck|stronghold|swamp_hut|village)
/locatebiome <biome>
/loot (give|insert|replace|spawn)
/me <action>
/msg <targets> <message>
/op <targets>
/pardon <targets>
/pardon-ip <target>
/particle <name> [<pos>]
/playsound <sound> (ambient|block|hostile|master|music|neutral|player|record|voice|weather)
/recipe (give|take)
/reload
/replaceitem (block|entity)
/save-all [flush]
/save-off
/save-on
/say <message>
/schedule (clear|function)
/scoreboard (objectives|players)
/seed
/setblock <pos> <block> [destroy|keep|replace]
/setidletimeout <minutes>
/setworldspawn [<pos>]
/spawnpoint [<targets>]
/spectate [<target>]
/spreadplayers <center> <spreadDistance> <maxRange> (under|<respectTeams>)
/stop
/stopsound <targets> [*|ambient|block|hostile|master|music|neutral|player|record|voice|weather]
/summon <entity> [<pos>]
/tag <targets> (add|list|remove)
/team (add|empty|join|leave|list|modify|remove)
/teammsg <message>
/teleport (<destination>|<location>|<targets>)
/tell -> msg
/tellraw <targets> <message>
/time (add|query|set)
/title <targets> (actionbar|clear|reset|subtitle|times|title)
/tm -> teammsg
/tp -> teleport
/trigger <objective> [add|set]
/w -> msg
/weather (clear|rain|thunder)
/whitelist (add|list|off|on|reload|remove)
/worldborder (add|center|damage|get|set|warning)
/xp -> experience
";

/// One line of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The verb without its leading slash, e.g. `gamemode`.
    pub name: String,
    /// The argument grammar, e.g. `(adventure|creative|spectator|survival)`.
    pub grammar: String,
    /// For alias lines, the verb this one stands for.
    pub alias_of: Option<String>,
}

impl CatalogEntry {
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// Number of grammar tokens that are not optional (`[...]`).
    pub fn required_args(&self) -> usize {
        self.grammar
            .split_whitespace()
            .filter(|token| !token.starts_with('['))
            .count()
    }
}

/// Parses one catalog line. Blank lines and lines not starting with `/` yield `None`.
pub fn parse_line(line: &str) -> Option<CatalogEntry> {
    let line = line.trim().strip_prefix('/')?;
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    if name.is_empty() {
        return None;
    }

    let alias_of = rest
        .strip_prefix("->")
        .map(|target| target.trim().to_string());
    let grammar = if alias_of.is_some() { "" } else { rest };

    Some(CatalogEntry {
        name: name.to_string(),
        grammar: grammar.to_string(),
        alias_of,
    })
}

/// Parses an arbitrary catalog text.
pub fn parse(raw: &str) -> Vec<CatalogEntry> {
    raw.lines().filter_map(parse_line).collect()
}

/// Returns every entry of the built-in catalog, aliases included.
pub fn entries() -> Vec<CatalogEntry> {
    parse(RAW_CATALOG)
}

/// Returns the entries that should be registered as commands.
pub fn canonical_entries() -> impl Iterator<Item = CatalogEntry> {
    entries().into_iter().filter(|entry| !entry.is_alias())
}
