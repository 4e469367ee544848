//! Every interposed function, its group, real-symbol cell and budget.

use fu53_policy::{Operation, PolicyGroup};

macro_rules! operations {
    ($($group:ident { $($ident:ident = $name:literal),* $(,)? })*) => {
        $($(
            pub(crate) static $ident: Operation = Operation::new($name, PolicyGroup::$group);
        )*)*
    };
}

operations! {
    Open {
        OPEN = c"open",
        OPEN64 = c"open64",
        OPENAT = c"openat",
        OPENAT64 = c"openat64",
        OPEN_2 = c"__open_2",
        OPEN64_2 = c"__open64_2",
        OPENAT_2 = c"__openat_2",
        OPENAT64_2 = c"__openat64_2",
        CREAT = c"creat",
        CREAT64 = c"creat64",
        FOPEN = c"fopen",
        FOPEN64 = c"fopen64",
        FDOPEN = c"fdopen",
        FREOPEN = c"freopen",
        FREOPEN64 = c"freopen64",
        DLOPEN = c"dlopen",
    }
    Remove {
        REMOVE = c"remove",
        UNLINK = c"unlink",
        UNLINKAT = c"unlinkat",
        RMDIR = c"rmdir",
    }
    Exec {
        EXECV = c"execv",
        EXECVE = c"execve",
        EXECVP = c"execvp",
        EXECVPE = c"execvpe",
        EXECVEAT = c"execveat",
        FEXECVE = c"fexecve",
    }
    Rename {
        RENAME = c"rename",
        RENAMEAT = c"renameat",
        RENAMEAT2 = c"renameat2",
    }
    Change {
        CHOWN = c"chown",
        LCHOWN = c"lchown",
        FCHOWN = c"fchown",
        FCHOWNAT = c"fchownat",
        CHMOD = c"chmod",
        FCHMOD = c"fchmod",
        FCHMODAT = c"fchmodat",
    }
    System {
        SYSTEM = c"system",
        SYSCALL = c"syscall",
        CHROOT = c"chroot",
        MOUNT = c"mount",
        UMOUNT = c"umount",
        UMOUNT2 = c"umount2",
        UNSHARE = c"unshare",
    }
    Fork {
        FORK = c"fork",
        POPEN = c"popen",
    }
    Parallel {
        MKFIFO = c"mkfifo",
        MKFIFOAT = c"mkfifoat",
        MKNOD = c"mknod",
        MKNODAT = c"mknodat",
        SEM_OPEN = c"sem_open",
        SEMCTL = c"semctl",
        SEMGET = c"semget",
        PIPE = c"pipe",
        PIPE2 = c"pipe2",
    }
    Dup {
        DUP = c"dup",
        DUP2 = c"dup2",
        DUP3 = c"dup3",
    }
    Env {
        SETENV = c"setenv",
        UNSETENV = c"unsetenv",
    }
}
