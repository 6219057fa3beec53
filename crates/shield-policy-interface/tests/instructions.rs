//! Instruction builder tests.

mod common;

use common::*;
use shield_policy_interface::instruction::{
    InstructionBuilder, ShieldInstruction, owner_accounts, payer_accounts,
};
use shield_policy_interface::pda::find_associated_token_address;
use shield_policy_interface::{PermissionStrategy, PolicyAccount, SYSTEM_PROGRAM_ID};
use solana_pubkey::Pubkey;

#[test]
fn test_create_policy_targets_reference_pda() {
    let mut rng = rng();
    let mint = random_identity(&mut rng);
    let owner = random_identity(&mut rng);

    let created = InstructionBuilder::new()
        .create_policy(&mint, &owner, None, PermissionStrategy::Allow)
        .unwrap();
    let (address, bump) = reference_policy_pda(&mint, &SHIELD_PROGRAM_ID);

    assert_eq!(created.policy.address, address);
    assert_eq!(created.policy.bump, bump);
    let policy_meta = created.instruction.accounts[payer_accounts::POLICY];
    assert_eq!(policy_meta.pubkey, address);
    assert_eq!(
        ShieldInstruction::unpack(&created.instruction.data),
        Ok(ShieldInstruction::CreatePolicy {
            strategy: PermissionStrategy::Allow,
        })
    );
}

#[test]
fn test_token_account_is_reference_ata() {
    let mint = [12u8; 32];
    let owner = [13u8; 32];
    let token_2022 = Pubkey::new_from_array(five8_const::decode_32_const(
        shield_program_ids::TOKEN_2022_PROGRAM_ID,
    ));
    let ata_program = Pubkey::new_from_array(five8_const::decode_32_const(
        shield_program_ids::ASSOCIATED_TOKEN_PROGRAM_ID,
    ));
    let (expected, _) = Pubkey::find_program_address(
        &[owner.as_ref(), token_2022.as_ref(), mint.as_ref()],
        &ata_program,
    );

    let token_account = find_associated_token_address(&owner, &mint).unwrap();
    assert_eq!(token_account.address, expected.to_bytes());
}

#[test]
fn test_instruction_sequence_replays_on_account() {
    let builder = InstructionBuilder::new();
    let mint = [30u8; 32];
    let owner = [31u8; 32];

    let created = builder
        .create_policy(&mint, &owner, None, PermissionStrategy::Deny)
        .unwrap();
    let instructions = [
        builder.add_identity(&mint, &owner, None, &[1u8; 32]),
        builder.add_identity(&mint, &owner, None, &[2u8; 32]),
        builder.remove_identity(&mint, &owner, 0),
        builder.replace_identity(&mint, &owner, 1, &[3u8; 32]),
    ];

    let create = ShieldInstruction::unpack(&created.instruction.data);
    let Ok(ShieldInstruction::CreatePolicy { strategy }) = create else {
        panic!("expected CreatePolicy");
    };
    let (mut account, _) = PolicyAccount::create(
        shield_policy_interface::SchemaVersion::LATEST,
        strategy,
        created.policy.bump,
        &mint,
    );

    for instruction in instructions {
        let instruction = instruction.unwrap();
        match ShieldInstruction::unpack(&instruction.data).unwrap() {
            ShieldInstruction::AddIdentity { identity } => {
                assert_eq!(instruction.accounts.len(), payer_accounts::COUNT);
                account.add_identity(&identity).unwrap();
            }
            ShieldInstruction::RemoveIdentity { index } => {
                assert_eq!(instruction.accounts.len(), owner_accounts::COUNT);
                account.remove_identity(index as usize).unwrap();
            }
            ShieldInstruction::ReplaceIdentity { index, identity } => {
                assert_eq!(instruction.accounts.len(), owner_accounts::COUNT);
                let index = index as usize;
                account.replace_identity(index, &identity).unwrap();
            }
            other => panic!("unexpected instruction {other:?}"),
        }
    }

    let identities: Vec<&[u8; 32]> = account.identities().collect();
    assert_eq!(identities, vec![&[3u8; 32]]);
    assert_eq!(account.mint(), Some(&mint));
}

#[test]
fn test_close_policy_refunds_payer() {
    let payer = [50u8; 32];
    let instruction = InstructionBuilder::new()
        .close_policy(&[51u8; 32], &[52u8; 32], Some(&payer))
        .unwrap();

    let payer_meta = instruction.accounts[payer_accounts::PAYER];
    assert_eq!(payer_meta.pubkey, payer);
    assert!(payer_meta.is_writable && payer_meta.is_signer);
    assert_eq!(
        instruction.accounts[payer_accounts::SYSTEM_PROGRAM].pubkey,
        SYSTEM_PROGRAM_ID
    );
}
