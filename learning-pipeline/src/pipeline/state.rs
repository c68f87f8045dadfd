use state_machines::state_machine;

state_machine! {
    name: LearnMachine,
    state: LearnState,
    initial: Ready,
    states: [Ready, TopicSelected, Fetched, Extracted, VocabPersisted, GraphUpdated, QueueUpdated, Failed],
    events {
        select { transition: { from: Ready, to: TopicSelected } }
        fetch { transition: { from: TopicSelected, to: Fetched } }
        extract { transition: { from: Fetched, to: Extracted } }
        persist_vocab { transition: { from: Extracted, to: VocabPersisted } }
        update_graph { transition: { from: VocabPersisted, to: GraphUpdated } }
        update_queue { transition: { from: GraphUpdated, to: QueueUpdated } }
        abort {
            transition: { from: Ready, to: Failed }
            transition: { from: TopicSelected, to: Failed }
            transition: { from: Fetched, to: Failed }
            transition: { from: Extracted, to: Failed }
            transition: { from: VocabPersisted, to: Failed }
            transition: { from: GraphUpdated, to: Failed }
            transition: { from: QueueUpdated, to: Failed }
        }
    }
}

pub fn ready() -> LearnMachine<(), Ready> {
    LearnMachine::new(())
}
